use crate::AppState;
use crate::api::error::AppError;
use crate::utils::auth::validate_jwt;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Admin gate: a valid bearer token issued to the configured admin user.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // No password hash means admin access is disabled
    if state.config.admin_password_hash.is_none() {
        return Err(AppError::Unauthorized(
            "Admin login is not configured".to_string(),
        ));
    }

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|s| s.to_string())
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = validate_jwt(&token, &state.config.jwt_secret)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    // Tokens outlive a change of the configured admin name
    if claims.sub != state.config.admin_username {
        return Err(AppError::Unauthorized("Invalid or expired token".to_string()));
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
