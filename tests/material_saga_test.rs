mod common;

use bytes::Bytes;
use common::*;
use sea_orm::{DatabaseBackend, DbErr, EntityTrait, MockDatabase, MockExecResult};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use study_portal::api::error::AppError;
use study_portal::entities::prelude::*;
use study_portal::services::material_service::{
    MaterialService, MaterialUpdate, NewMaterial, UploadedFile,
};
use study_portal::services::view_cache::{ADMIN_MATERIALS, ViewCache, class_view};

fn service(
    db: sea_orm::DatabaseConnection,
    storage: Arc<MockStorageService>,
) -> (MaterialService, Arc<ViewCache>) {
    let cache = Arc::new(ViewCache::new());
    let svc = MaterialService::new(db, storage, cache.clone(), test_config());
    (svc, cache)
}

fn pdf_upload(title: &str, class: &str, category: Option<&str>) -> NewMaterial {
    NewMaterial {
        title: title.to_string(),
        class: class.to_string(),
        category_id: category.map(str::to_string),
        file: Some(UploadedFile {
            file_name: "chapter 1.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            data: Bytes::from_static(b"%PDF-1.7 fake"),
        }),
    }
}

#[tokio::test]
async fn test_short_title_never_touches_storage_or_database() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let storage = MockStorageService::new();
    let (svc, _) = service(db.clone(), storage.clone());

    let err = svc
        .upload(pdf_upload("ab", "10", None))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(storage.calls(), 0);
    assert!(db.into_transaction_log().is_empty());
}

#[tokio::test]
async fn test_missing_or_empty_file_is_a_validation_error() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let storage = MockStorageService::new();
    let (svc, _) = service(db.clone(), storage.clone());

    let mut no_file = pdf_upload("Notes A", "10", None);
    no_file.file = None;
    assert!(matches!(
        svc.upload(no_file).await.unwrap_err(),
        AppError::Validation(_)
    ));

    let mut empty = pdf_upload("Notes A", "10", None);
    if let Some(file) = empty.file.as_mut() {
        file.data = Bytes::new();
    }
    assert!(matches!(
        svc.upload(empty).await.unwrap_err(),
        AppError::Validation(_)
    ));

    let unknown_class = pdf_upload("Notes A", "11", None);
    assert!(matches!(
        svc.upload(unknown_class).await.unwrap_err(),
        AppError::Validation(_)
    ));

    assert_eq!(storage.calls(), 0);
    assert!(db.into_transaction_log().is_empty());
}

#[tokio::test]
async fn test_upload_stores_file_and_inserts_row() {
    let db = setup_test_db().await;
    let storage = MockStorageService::new();
    let (svc, _) = service(db.clone(), storage.clone());

    let material = svc
        .upload(pdf_upload("  Notes A  ", "10", Some("null")))
        .await
        .unwrap();

    assert_eq!(material.title, "Notes A");
    assert_eq!(material.class, "10");
    assert_eq!(material.category_id, None);
    assert_eq!(material.size, 13);
    assert_eq!(storage.puts.load(Ordering::SeqCst), 1);
    assert_eq!(storage.deletes.load(Ordering::SeqCst), 0);

    let key = material.file_path.clone().unwrap();
    assert!(key.starts_with("10/"));
    assert!(key.ends_with("-chapter 1.pdf"));
    assert_eq!(storage.stored_keys(), vec![key]);
    assert_eq!(
        material.file_url,
        format!("https://cdn.example.com/materials/{}", material.file_path.unwrap())
    );

    let rows = Materials::find().all(&db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, material.id);
}

#[tokio::test]
async fn test_storage_write_failure_surfaces_without_insert() {
    let db = setup_test_db().await;
    let storage = MockStorageService::new();
    storage.fail_put.store(true, Ordering::SeqCst);
    let (svc, _) = service(db.clone(), storage.clone());

    let err = svc
        .upload(pdf_upload("Notes A", "10", None))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::StorageWrite(_)));
    assert_eq!(storage.deletes.load(Ordering::SeqCst), 0);
    assert!(Materials::find().all(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_url_failure_removes_stored_file() {
    let db = setup_test_db().await;
    let storage = MockStorageService::new();
    storage.fail_url.store(true, Ordering::SeqCst);
    let (svc, _) = service(db.clone(), storage.clone());

    let err = svc
        .upload(pdf_upload("Notes A", "10", None))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::UrlResolution(_)));
    assert_eq!(storage.deletes.load(Ordering::SeqCst), 1);
    assert!(storage.stored_keys().is_empty());
    assert!(Materials::find().all(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_insert_failure_runs_exactly_one_compensating_delete() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("duplicate key value".to_string())])
        .into_connection();
    let storage = MockStorageService::new();
    let (svc, _) = service(db, storage.clone());

    let err = svc
        .upload(pdf_upload("Notes A", "12-science", None))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DatabaseInsert(_)));
    assert_eq!(storage.puts.load(Ordering::SeqCst), 1);
    assert_eq!(storage.deletes.load(Ordering::SeqCst), 1);
    assert!(storage.stored_keys().is_empty());
}

#[tokio::test]
async fn test_insert_failure_on_unknown_category_rolls_back_storage() {
    // Foreign keys are enforced by SQLite, so the insert itself fails
    let db = setup_test_db().await;
    let storage = MockStorageService::new();
    let (svc, _) = service(db.clone(), storage.clone());

    let err = svc
        .upload(pdf_upload("Notes A", "10", Some("no-such-category")))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DatabaseInsert(_)));
    assert_eq!(storage.deletes.load(Ordering::SeqCst), 1);
    assert!(storage.stored_keys().is_empty());
}

#[tokio::test]
async fn test_failed_compensation_still_returns_original_error() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("connection closed".to_string())])
        .into_connection();
    let storage = MockStorageService::new();
    storage.fail_delete.store(true, Ordering::SeqCst);
    let (svc, _) = service(db, storage.clone());

    let err = svc
        .upload(pdf_upload("Notes A", "10", None))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DatabaseInsert(_)));
    assert_eq!(storage.deletes.load(Ordering::SeqCst), 1);
    // The orphan stays behind
    assert_eq!(storage.stored_keys().len(), 1);
}

#[tokio::test]
async fn test_delete_without_file_path_skips_storage() {
    let existing = material_model("m1", "10", None);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![existing]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let storage = MockStorageService::new();
    let (svc, _) = service(db.clone(), storage.clone());

    let outcome = svc.delete("m1").await.unwrap();

    assert!(outcome.warning.is_none());
    assert_eq!(storage.calls(), 0);

    let log = db.into_transaction_log();
    let deletes = log
        .iter()
        .filter(|t| format!("{:?}", t).contains("DELETE FROM"))
        .count();
    assert_eq!(log.len(), 2);
    assert_eq!(deletes, 1);
}

#[tokio::test]
async fn test_delete_proceeds_when_file_already_gone() {
    let db = setup_test_db().await;
    insert_material(&db, "m1", "10", None, Some("10/1700000000000-gone.pdf")).await;
    let storage = MockStorageService::new();
    let (svc, _) = service(db.clone(), storage.clone());

    let outcome = svc.delete("m1").await.unwrap();

    assert!(outcome.warning.is_none());
    assert_eq!(storage.deletes.load(Ordering::SeqCst), 1);
    assert!(Materials::find_by_id("m1").one(&db).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_storage_failure_becomes_warning() {
    let db = setup_test_db().await;
    insert_material(&db, "m1", "10", None, Some("10/1700000000000-notes.pdf")).await;
    let storage = MockStorageService::new();
    storage.put_object("10/1700000000000-notes.pdf", b"data");
    storage.fail_delete.store(true, Ordering::SeqCst);
    let (svc, _) = service(db.clone(), storage.clone());

    let outcome = svc.delete("m1").await.unwrap();

    let warning = outcome.warning.unwrap();
    assert!(warning.contains("connection reset by peer"));
    assert!(Materials::find_by_id("m1").one(&db).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_database_failure() {
    let existing = material_model("m1", "10", None);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![existing]])
        .append_exec_errors([DbErr::Custom("disk I/O error".to_string())])
        .into_connection();
    let (svc, _) = service(db, MockStorageService::new());

    let err = svc.delete("m1").await.unwrap_err();
    assert!(matches!(err, AppError::DatabaseDelete(_)));
}

#[tokio::test]
async fn test_delete_unknown_material_is_not_found() {
    let db = setup_test_db().await;
    let storage = MockStorageService::new();
    let (svc, _) = service(db, storage.clone());

    assert!(matches!(
        svc.delete("missing").await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert_eq!(storage.calls(), 0);
}

#[tokio::test]
async fn test_upload_and_delete_invalidate_class_view() {
    let db = setup_test_db().await;
    let storage = MockStorageService::new();
    let (svc, cache) = service(db, storage);

    let class = study_portal::models::MaterialClass::TwelveArts;
    svc.class_listing(class).await.unwrap();
    cache.insert(ADMIN_MATERIALS, serde_json::json!([]));
    assert!(cache.contains(&class_view("12-arts")));

    let material = svc
        .upload(pdf_upload("History Notes", "12-arts", None))
        .await
        .unwrap();
    assert!(!cache.contains(&class_view("12-arts")));
    assert!(!cache.contains(ADMIN_MATERIALS));

    let listing = svc.class_listing(class).await.unwrap();
    assert_eq!(listing.materials.len(), 1);
    assert!(cache.contains(&class_view("12-arts")));

    svc.delete(&material.id).await.unwrap();
    assert!(!cache.contains(&class_view("12-arts")));
    assert!(svc.class_listing(class).await.unwrap().materials.is_empty());
}

#[tokio::test]
async fn test_update_rejects_short_title_before_database() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let (svc, _) = service(db.clone(), MockStorageService::new());

    let err = svc
        .update(
            "m1",
            MaterialUpdate {
                title: "ab".to_string(),
                class: "10".to_string(),
                category_id: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(db.into_transaction_log().is_empty());
}

#[tokio::test]
async fn test_update_moves_material_between_classes() {
    let db = setup_test_db().await;
    insert_category(&db, "notes", None, "12", 10).await;
    insert_material(&db, "m1", "10", None, Some("10/1-a.pdf")).await;
    let (svc, cache) = service(db.clone(), MockStorageService::new());
    cache.insert(class_view("10"), serde_json::json!({}));
    cache.insert(class_view("12-science"), serde_json::json!({}));

    let updated = svc
        .update(
            "m1",
            MaterialUpdate {
                title: "Optics Notes".to_string(),
                class: "12-science".to_string(),
                category_id: Some("notes".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Optics Notes");
    assert_eq!(updated.class, "12-science");
    assert_eq!(updated.category_id.as_deref(), Some("notes"));
    assert_eq!(updated.file_path.as_deref(), Some("10/1-a.pdf"));
    assert!(!cache.contains(&class_view("10")));
    assert!(!cache.contains(&class_view("12-science")));

    let missing = svc
        .update(
            "nope",
            MaterialUpdate {
                title: "Optics Notes".to_string(),
                class: "10".to_string(),
                category_id: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(missing, AppError::NotFound(_)));
}
