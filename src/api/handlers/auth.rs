use crate::api::error::AppError;
use crate::utils::auth::{create_jwt, verify_password};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 100))]
    pub username: String,
    #[validate(length(min = 1, max = 256))]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "admin"
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    payload
        .validate()
        .map_err(|_| AppError::Validation("Username and password are required.".to_string()))?;

    let hash = state
        .config
        .admin_password_hash
        .as_deref()
        .ok_or_else(|| AppError::Unauthorized("Admin login is not configured".to_string()))?;

    if payload.username != state.config.admin_username
        || !verify_password(&payload.password, hash)
    {
        tracing::warn!("🔐 Rejected admin login for '{}'", payload.username);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = create_jwt(&payload.username, &state.config.jwt_secret)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!("🔓 Admin '{}' logged in", payload.username);
    Ok(Json(LoginResponse {
        success: true,
        token,
    }))
}
