use crate::api::error::AppError;
use crate::entities::{categories, materials, prelude::*};
use crate::models::MaterialClass;
use crate::services::view_cache::class_view;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use super::{ClassListing, MaterialService};

impl MaterialService {
    pub async fn get(&self, id: &str) -> Result<materials::Model, AppError> {
        Materials::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Material not found".to_string()))
    }

    /// Every material, newest first.
    pub async fn list_all(&self) -> Result<Vec<materials::Model>, AppError> {
        Ok(Materials::find()
            .order_by_desc(materials::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn list_by_class(
        &self,
        class: MaterialClass,
    ) -> Result<Vec<materials::Model>, AppError> {
        Ok(Materials::find()
            .filter(materials::Column::Class.eq(class.as_str()))
            .order_by_desc(materials::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Materials of a class plus the full category set for its page, served from the view
    /// cache when a prior request already loaded them.
    pub async fn class_listing(&self, class: MaterialClass) -> Result<ClassListing, AppError> {
        let key = class_view(class.as_str());
        if let Some(cached) = self.cache.get(&key) {
            match serde_json::from_value::<ClassListing>(cached) {
                Ok(listing) => return Ok(listing),
                Err(e) => tracing::warn!("Discarding unreadable cached view {}: {}", key, e),
            }
        }

        let generation = self.cache.generation();
        let materials = self.list_by_class(class).await?;
        let categories = Categories::find()
            .order_by_asc(categories::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let listing = ClassListing {
            materials,
            categories,
        };
        match serde_json::to_value(&listing) {
            Ok(value) => {
                self.cache.insert_if_current(key, value, generation);
            }
            Err(e) => tracing::warn!("Could not cache view {}: {}", key, e),
        }
        Ok(listing)
    }
}
