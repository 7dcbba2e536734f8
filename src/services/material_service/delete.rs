use crate::api::error::AppError;
use crate::entities::prelude::*;
use sea_orm::EntityTrait;

use super::{DeleteOutcome, MaterialService};

impl MaterialService {
    /// Removes the stored file (when the row has a path) and then the row.
    ///
    /// A file that is already gone is not an error. Any other storage failure
    /// leaves an orphaned object behind; the row is still deleted and the
    /// failure is reported back as a warning.
    pub async fn delete(&self, id: &str) -> Result<DeleteOutcome, AppError> {
        let material = Materials::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Material not found".to_string()))?;

        let mut outcome = DeleteOutcome::default();

        if let Some(path) = material.file_path.as_deref().filter(|p| !p.is_empty()) {
            match self.storage.delete_file(path).await {
                Ok(()) => tracing::info!("🗑️  Removed stored object {}", path),
                Err(e) if e.is_not_found() => {
                    tracing::warn!("Stored object {} already gone, continuing", path)
                }
                Err(e) => {
                    tracing::error!("❌ Could not remove stored object {}: {:?}", path, e);
                    outcome.warning = Some(AppError::StorageDelete(e.to_string()).to_string());
                }
            }
        }

        let res = Materials::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| AppError::DatabaseDelete(e.to_string()))?;

        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Material not found".to_string()));
        }

        self.cache.invalidate_material(&material.class);
        tracing::info!("✅ Material {} deleted", id);
        Ok(outcome)
    }
}
