use crate::api::error::AppError;
use crate::entities::materials;
use crate::services::saga::Saga;
use crate::utils::validation::{
    normalize_category_id, parse_class, sanitize_filename, storage_key, validate_file_size,
    validate_title,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use super::{MaterialService, NewMaterial};

impl MaterialService {
    /// Stores the file, resolves its public URL and records the material row.
    ///
    /// A failure after the file was written removes it again before the error
    /// is returned; a failed removal is only logged.
    pub async fn upload(&self, input: NewMaterial) -> Result<materials::Model, AppError> {
        let title = validate_title(&input.title)?;
        let class = parse_class(&input.class)?;
        let file = input
            .file
            .ok_or_else(|| AppError::Validation("File is required.".to_string()))?;
        validate_file_size(file.data.len(), self.config.max_file_size)?;
        let file_name = sanitize_filename(&file.file_name)?;
        let category_id = normalize_category_id(input.category_id.as_deref());

        let key = storage_key(class, Utc::now().timestamp_millis(), &file_name);
        let size = file.data.len() as i64;

        tracing::info!(
            "📤 Uploading material '{}' ({} bytes) to {}",
            title,
            size,
            key
        );

        let path = self
            .storage
            .upload_file(&key, file.data, file.content_type.as_deref())
            .await
            .map_err(|e| AppError::StorageWrite(e.to_string()))?;

        let mut saga = Saga::new("upload_material");
        let storage = self.storage.clone();
        let stored = path.clone();
        saga.on_rollback(format!("remove stored object {}", path), async move {
            storage.delete_file(&stored).await.map_err(anyhow::Error::from)
        });

        let file_url = match self.storage.get_public_url(&path).await {
            Ok(url) => url,
            Err(e) => {
                saga.rollback().await;
                return Err(AppError::UrlResolution(e.to_string()));
            }
        };

        let material = materials::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            title: Set(title),
            class: Set(class.as_str().to_string()),
            category_id: Set(category_id),
            file_url: Set(file_url),
            file_path: Set(Some(path)),
            size: Set(size),
            created_at: Set(Utc::now()),
        };

        let inserted = match material.insert(&self.db).await {
            Ok(m) => m,
            Err(e) => {
                tracing::error!("❌ Material insert failed: {:?}", e);
                saga.rollback().await;
                return Err(AppError::DatabaseInsert(e.to_string()));
            }
        };

        saga.complete();
        self.cache.invalidate_material(class.as_str());

        tracing::info!("✅ Material {} stored at {:?}", inserted.id, inserted.file_path);
        Ok(inserted)
    }
}
