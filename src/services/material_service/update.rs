use crate::api::error::AppError;
use crate::entities::{materials, prelude::*};
use crate::utils::validation::{normalize_category_id, parse_class, validate_title};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use super::{MaterialService, MaterialUpdate};

impl MaterialService {
    pub async fn update(
        &self,
        id: &str,
        changes: MaterialUpdate,
    ) -> Result<materials::Model, AppError> {
        let title = validate_title(&changes.title)?;
        let class = parse_class(&changes.class)?;
        let category_id = normalize_category_id(changes.category_id.as_deref());

        let existing = Materials::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Material not found".to_string()))?;
        let previous_class = existing.class.clone();

        let mut active: materials::ActiveModel = existing.into();
        active.title = Set(title);
        active.class = Set(class.as_str().to_string());
        active.category_id = Set(category_id);

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| AppError::DatabaseUpdate(e.to_string()))?;

        self.cache.invalidate_material(&previous_class);
        if previous_class != updated.class {
            self.cache.invalidate_material(&updated.class);
        }

        Ok(updated)
    }
}
