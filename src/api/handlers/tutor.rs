use crate::api::error::AppError;
use crate::services::tutor::ChatTurn;
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Deserialize, Validate, ToSchema)]
pub struct AskRequest {
    #[validate(length(max = 4000))]
    pub question: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub history: Vec<ChatTurn>,
}

#[derive(Serialize, ToSchema)]
pub struct AskResponse {
    pub answer: String,
}

#[utoipa::path(
    post,
    path = "/ask-ai",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Tutor answer", body = AskResponse),
        (status = 400, description = "Empty or oversized question"),
        (status = 502, description = "Completion service failed")
    ),
    tag = "tutor"
)]
pub async fn ask_ai(
    State(state): State<crate::AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let answer = state.tutor.ask(&req.question, &req.history).await?;
    Ok(Json(AskResponse { answer }))
}
