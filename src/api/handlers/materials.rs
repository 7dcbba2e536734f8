use crate::api::error::AppError;
use crate::models::MaterialResponse;
use crate::services::material_service::{MaterialUpdate, NewMaterial, UploadedFile};
use crate::services::view_cache::ADMIN_MATERIALS;
use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct MaterialMutationResponse {
    pub success: bool,
    pub material: MaterialResponse,
}

#[derive(Serialize, ToSchema)]
pub struct DeleteMaterialResponse {
    pub success: bool,
    /// Present when the row was removed but its stored file was not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[utoipa::path(
    get,
    path = "/admin/materials",
    responses(
        (status = 200, description = "All materials, newest first", body = Vec<MaterialResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "admin"
)]
pub async fn list_materials(
    State(state): State<crate::AppState>,
) -> Result<Json<Value>, AppError> {
    if let Some(cached) = state.cache.get(ADMIN_MATERIALS) {
        return Ok(Json(cached));
    }

    let generation = state.cache.generation();
    let materials: Vec<MaterialResponse> = state
        .material_service
        .list_all()
        .await?
        .into_iter()
        .map(MaterialResponse::from)
        .collect();

    let value = serde_json::to_value(&materials).map_err(|e| AppError::Internal(e.to_string()))?;
    state
        .cache
        .insert_if_current(ADMIN_MATERIALS, value.clone(), generation);
    Ok(Json(value))
}

#[utoipa::path(
    get,
    path = "/admin/materials/{id}",
    params(
        ("id" = String, Path, description = "Material ID")
    ),
    responses(
        (status = 200, description = "Material", body = MaterialResponse),
        (status = 404, description = "Material not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "admin"
)]
pub async fn get_material(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> Result<Json<MaterialResponse>, AppError> {
    let material = state.material_service.get(&id).await?;
    Ok(Json(material.into()))
}

#[utoipa::path(
    post,
    path = "/admin/materials",
    request_body(content = Multipart, description = "Fields: title, class, category_id, file"),
    responses(
        (status = 200, description = "Material uploaded", body = MaterialMutationResponse),
        (status = 400, description = "Invalid form"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "admin"
)]
pub async fn upload_material(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<Json<MaterialMutationResponse>, AppError> {
    let mut input = NewMaterial {
        title: String::new(),
        class: String::new(),
        category_id: None,
        file: None,
    };

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        let msg = e.to_string();
        if msg.contains("length limit exceeded") {
            AppError::Validation("Request body exceeds the maximum allowed limit".to_string())
        } else {
            AppError::Validation(msg)
        }
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                input.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            "title" | "class" | "category_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                match name.as_str() {
                    "title" => input.title = value,
                    "class" => input.class = value,
                    _ => input.category_id = Some(value),
                }
            }
            other => tracing::debug!("Ignoring unexpected form field '{}'", other),
        }
    }

    let material = state.material_service.upload(input).await?;
    Ok(Json(MaterialMutationResponse {
        success: true,
        material: material.into(),
    }))
}

#[utoipa::path(
    put,
    path = "/admin/materials/{id}",
    params(
        ("id" = String, Path, description = "Material ID")
    ),
    request_body = MaterialUpdate,
    responses(
        (status = 200, description = "Material updated", body = MaterialMutationResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Material not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "admin"
)]
pub async fn update_material(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(req): Json<MaterialUpdate>,
) -> Result<Json<MaterialMutationResponse>, AppError> {
    let material = state.material_service.update(&id, req).await?;
    Ok(Json(MaterialMutationResponse {
        success: true,
        material: material.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/admin/materials/{id}",
    params(
        ("id" = String, Path, description = "Material ID")
    ),
    responses(
        (status = 200, description = "Material deleted", body = DeleteMaterialResponse),
        (status = 404, description = "Material not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "admin"
)]
pub async fn delete_material(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteMaterialResponse>, AppError> {
    let outcome = state.material_service.delete(&id).await?;
    Ok(Json(DeleteMaterialResponse {
        success: true,
        warning: outcome.warning,
    }))
}
