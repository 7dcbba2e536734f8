use crate::api::error::AppError;
use crate::models::CategoryResponse;
use crate::services::category_service::{CategoryInput, CategoryWithCount};
use crate::services::category_tree::CategoryTree;
use crate::services::view_cache::ADMIN_CATEGORIES;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Entry of the indented parent picker in the admin form.
#[derive(Serialize, ToSchema)]
pub struct CategoryOption {
    pub id: String,
    pub name: String,
    pub depth: usize,
}

#[derive(Serialize, ToSchema)]
pub struct AdminCategoriesResponse {
    pub categories: Vec<CategoryWithCount>,
    pub options: Vec<CategoryOption>,
}

#[derive(Serialize, ToSchema)]
pub struct CategoryMutationResponse {
    pub success: bool,
    pub category: CategoryResponse,
}

#[derive(Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

#[utoipa::path(
    get,
    path = "/admin/categories",
    responses(
        (status = 200, description = "Categories with material counts", body = AdminCategoriesResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "admin"
)]
pub async fn list_categories(
    State(state): State<crate::AppState>,
) -> Result<Json<Value>, AppError> {
    if let Some(cached) = state.cache.get(ADMIN_CATEGORIES) {
        return Ok(Json(cached));
    }

    let generation = state.cache.generation();
    let all = state.category_service.all().await?;
    let options = CategoryTree::new(&all)
        .flatten_options()
        .into_iter()
        .map(|(depth, c)| CategoryOption {
            id: c.id.clone(),
            name: c.name.clone(),
            depth,
        })
        .collect();
    let categories = state.category_service.with_counts(all).await?;

    let value = serde_json::to_value(AdminCategoriesResponse {
        categories,
        options,
    })
    .map_err(|e| AppError::Internal(e.to_string()))?;
    state
        .cache
        .insert_if_current(ADMIN_CATEGORIES, value.clone(), generation);
    Ok(Json(value))
}

#[utoipa::path(
    post,
    path = "/admin/categories",
    request_body = CategoryInput,
    responses(
        (status = 200, description = "Category created", body = CategoryMutationResponse),
        (status = 400, description = "Invalid input")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "admin"
)]
pub async fn create_category(
    State(state): State<crate::AppState>,
    Json(req): Json<CategoryInput>,
) -> Result<Json<CategoryMutationResponse>, AppError> {
    let category = state.category_service.create(req).await?;
    Ok(Json(CategoryMutationResponse {
        success: true,
        category: category.into(),
    }))
}

#[utoipa::path(
    put,
    path = "/admin/categories/{id}",
    params(
        ("id" = String, Path, description = "Category ID")
    ),
    request_body = CategoryInput,
    responses(
        (status = 200, description = "Category updated", body = CategoryMutationResponse),
        (status = 400, description = "Invalid input or cyclic parent"),
        (status = 404, description = "Category not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "admin"
)]
pub async fn update_category(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(req): Json<CategoryInput>,
) -> Result<Json<CategoryMutationResponse>, AppError> {
    let category = state.category_service.update(&id, req).await?;
    Ok(Json(CategoryMutationResponse {
        success: true,
        category: category.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/admin/categories/{id}",
    params(
        ("id" = String, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted", body = SuccessResponse),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category still has sub-categories")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "admin"
)]
pub async fn delete_category(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.category_service.delete(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}
