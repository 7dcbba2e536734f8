use crate::api::error::AppError;
use crate::entities::{categories, materials, prelude::*};
use crate::services::category_tree::{CategoryTree, sort_newest_first};
use crate::services::view_cache::ViewCache;
use crate::utils::validation::{
    normalize_category_id, parse_class_association, validate_category_name,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CategoryInput {
    pub name: String,
    pub class_association: String,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryWithCount {
    pub id: String,
    pub name: String,
    pub class_association: String,
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Materials filed directly under this category.
    pub material_count: u64,
}

struct ValidatedCategory {
    name: String,
    class_association: String,
    parent_id: Option<String>,
}

pub struct CategoryService {
    db: DatabaseConnection,
    cache: Arc<ViewCache>,
}

impl CategoryService {
    pub fn new(db: DatabaseConnection, cache: Arc<ViewCache>) -> Self {
        Self { db, cache }
    }

    pub async fn all(&self) -> Result<Vec<categories::Model>, AppError> {
        Ok(Categories::find()
            .order_by_asc(categories::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Newest first, each with its direct material count.
    pub async fn list(&self) -> Result<Vec<CategoryWithCount>, AppError> {
        let all = self.all().await?;
        self.with_counts(all).await
    }

    /// Attaches direct material counts to an already loaded category set and
    /// orders it newest first.
    pub async fn with_counts(
        &self,
        mut all: Vec<categories::Model>,
    ) -> Result<Vec<CategoryWithCount>, AppError> {
        sort_newest_first(&mut all);

        let assigned: Vec<Option<String>> = Materials::find()
            .select_only()
            .column(materials::Column::CategoryId)
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut counts: HashMap<String, u64> = HashMap::new();
        for id in assigned.into_iter().flatten() {
            *counts.entry(id).or_default() += 1;
        }

        Ok(all
            .into_iter()
            .map(|c| CategoryWithCount {
                material_count: counts.get(&c.id).copied().unwrap_or(0),
                id: c.id,
                name: c.name,
                class_association: c.class_association,
                parent_id: c.parent_id,
                created_at: c.created_at,
            })
            .collect())
    }

    pub async fn create(&self, input: CategoryInput) -> Result<categories::Model, AppError> {
        let valid = self.validate(None, input).await?;

        let category = categories::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(valid.name),
            class_association: Set(valid.class_association),
            parent_id: Set(valid.parent_id),
            created_at: Set(Utc::now()),
        };

        let inserted = category
            .insert(&self.db)
            .await
            .map_err(|e| AppError::DatabaseInsert(e.to_string()))?;

        self.cache.invalidate_categories();
        tracing::info!("📁 Category '{}' created ({})", inserted.name, inserted.id);
        Ok(inserted)
    }

    pub async fn update(
        &self,
        id: &str,
        input: CategoryInput,
    ) -> Result<categories::Model, AppError> {
        let valid = self.validate(Some(id), input).await?;

        let existing = Categories::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

        let mut active: categories::ActiveModel = existing.into();
        active.name = Set(valid.name);
        active.class_association = Set(valid.class_association);
        active.parent_id = Set(valid.parent_id);

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| AppError::DatabaseUpdate(e.to_string()))?;

        self.cache.invalidate_categories();
        Ok(updated)
    }

    /// Refuses while any category still names `id` as its parent.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let child = Categories::find()
            .filter(categories::Column::ParentId.eq(id))
            .limit(1)
            .one(&self.db)
            .await
            .map_err(|e| {
                AppError::DatabaseDelete(format!("could not verify category children: {}", e))
            })?;

        if child.is_some() {
            return Err(AppError::HasChildren(
                "This category has sub-categories. Please delete or re-assign them first."
                    .to_string(),
            ));
        }

        let res = Categories::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| AppError::DatabaseDelete(e.to_string()))?;

        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Category not found".to_string()));
        }

        self.cache.invalidate_categories();
        tracing::info!("🗑️  Category {} deleted", id);
        Ok(())
    }

    /// Field checks plus parent checks: the parent must exist and must not be
    /// `id` itself or one of its descendants.
    async fn validate(
        &self,
        id: Option<&str>,
        input: CategoryInput,
    ) -> Result<ValidatedCategory, AppError> {
        let name = validate_category_name(&input.name)?;
        let class_association = parse_class_association(&input.class_association)?;
        let parent_id = normalize_category_id(input.parent_id.as_deref());

        if let Some(parent) = parent_id.as_deref() {
            let all = Categories::find().all(&self.db).await?;
            let tree = CategoryTree::new(&all);

            if tree.get(parent).is_none() {
                return Err(AppError::Validation(
                    "Parent category not found.".to_string(),
                ));
            }
            if let Some(id) = id {
                if tree.would_create_cycle(id, parent) {
                    return Err(AppError::Validation(
                        "A category cannot be moved under itself or one of its sub-categories."
                            .to_string(),
                    ));
                }
            }
        }

        Ok(ValidatedCategory {
            name,
            class_association: class_association.as_str().to_string(),
            parent_id,
        })
    }
}
