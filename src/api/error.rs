use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Storage Error: {0}")]
    StorageWrite(String),

    #[error("Could not delete file: {0}")]
    StorageDelete(String),

    #[error("Could not get file URL: {0}")]
    UrlResolution(String),

    #[error("Database Error: {0}")]
    DatabaseInsert(String),

    #[error("Could not update: {0}")]
    DatabaseUpdate(String),

    #[error("Could not delete: {0}")]
    DatabaseDelete(String),

    #[error("{0}")]
    HasChildren(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("AI Error: {0}")]
    Ai(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl From<crate::utils::validation::ValidationError> for AppError {
    fn from(e: crate::utils::validation::ValidationError) -> Self {
        AppError::Validation(e.message)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::HasChildren(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::StorageWrite(_)
            | AppError::StorageDelete(_)
            | AppError::UrlResolution(_)
            | AppError::Ai(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseInsert(_)
            | AppError::DatabaseUpdate(_)
            | AppError::DatabaseDelete(_)
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Internal Server Error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal Server Error".to_string()
            }
            other => {
                if status.is_server_error() {
                    tracing::error!("{}", other);
                }
                other.to_string()
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message
        }));

        (status, body).into_response()
    }
}
