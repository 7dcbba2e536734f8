#![allow(dead_code)]

use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use study_portal::config::PortalConfig;
use study_portal::entities::{categories, materials};
use study_portal::infrastructure::database;
use study_portal::services::storage::{StorageError, StorageResult, StorageService};
use study_portal::services::tutor::CompletionClient;
use study_portal::utils::auth::hash_password;
use study_portal::AppState;

pub const ADMIN_PASSWORD: &str = "correct horse battery";

pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();
    db
}

/// In-memory bucket with call counters and switchable failures.
#[derive(Default)]
pub struct MockStorageService {
    pub files: Mutex<HashMap<String, Bytes>>,
    pub puts: AtomicUsize,
    pub deletes: AtomicUsize,
    pub url_lookups: AtomicUsize,
    pub fail_put: AtomicBool,
    pub fail_url: AtomicBool,
    /// Deletes fail with a non-"not found" error.
    pub fail_delete: AtomicBool,
}

impl MockStorageService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
            + self.deletes.load(Ordering::SeqCst)
            + self.url_lookups.load(Ordering::SeqCst)
    }

    pub fn stored_keys(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }

    pub fn put_object(&self, key: &str, data: &'static [u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(key.to_string(), Bytes::from_static(data));
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn upload_file(
        &self,
        key: &str,
        data: Bytes,
        _content_type: Option<&str>,
    ) -> StorageResult<String> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(StorageError::Other(anyhow!("bucket is read-only")));
        }
        self.files.lock().unwrap().insert(key.to_string(), data);
        Ok(key.to_string())
    }

    async fn delete_file(&self, key: &str) -> StorageResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StorageError::Other(anyhow!("connection reset by peer")));
        }
        match self.files.lock().unwrap().remove(key) {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound(key.to_string())),
        }
    }

    async fn file_exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.files.lock().unwrap().contains_key(key))
    }

    async fn get_public_url(&self, key: &str) -> StorageResult<String> {
        self.url_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_url.load(Ordering::SeqCst) {
            return Err(StorageError::Other(anyhow!("no public URL configured")));
        }
        Ok(format!("https://cdn.example.com/materials/{}", key))
    }
}

/// Completion client that echoes the last line of the prompt.
#[derive(Default)]
pub struct EchoCompletion {
    pub calls: AtomicUsize,
}

#[async_trait]
impl CompletionClient for EchoCompletion {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("Answer to: {}", prompt.lines().nth_back(2).unwrap_or("")))
    }
}

pub fn test_config() -> PortalConfig {
    PortalConfig {
        admin_password_hash: Some(hash_password(ADMIN_PASSWORD).unwrap()),
        jwt_secret: "test-secret".to_string(),
        ..PortalConfig::development()
    }
}

pub fn test_state(db: DatabaseConnection, storage: Arc<MockStorageService>) -> AppState {
    AppState::new(
        db,
        storage,
        Arc::new(EchoCompletion::default()),
        test_config(),
    )
}

/// Inserts a category `age_secs` seconds in the past.
pub async fn insert_category(
    db: &DatabaseConnection,
    id: &str,
    parent: Option<&str>,
    association: &str,
    age_secs: i64,
) -> categories::Model {
    categories::ActiveModel {
        id: Set(id.to_string()),
        name: Set(format!("Category {}", id)),
        class_association: Set(association.to_string()),
        parent_id: Set(parent.map(str::to_string)),
        created_at: Set(Utc::now() - Duration::seconds(age_secs)),
    }
    .insert(db)
    .await
    .unwrap()
}

pub fn material_model(id: &str, class: &str, file_path: Option<&str>) -> materials::Model {
    materials::Model {
        id: id.to_string(),
        title: format!("Material {}", id),
        class: class.to_string(),
        category_id: None,
        file_url: format!("https://cdn.example.com/materials/{}/{}.pdf", class, id),
        file_path: file_path.map(str::to_string),
        size: 2048,
        created_at: Utc::now(),
    }
}

pub async fn insert_material(
    db: &DatabaseConnection,
    id: &str,
    class: &str,
    category: Option<&str>,
    file_path: Option<&str>,
) -> materials::Model {
    let model = material_model(id, class, file_path);
    materials::ActiveModel {
        id: Set(model.id),
        title: Set(model.title),
        class: Set(model.class),
        category_id: Set(category.map(str::to_string)),
        file_url: Set(model.file_url),
        file_path: Set(model.file_path),
        size: Set(model.size),
        created_at: Set(model.created_at),
    }
    .insert(db)
    .await
    .unwrap()
}
