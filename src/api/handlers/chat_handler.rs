use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::chat_dto::*},
    error::AppError,
    models::UserId,
};

pub async fn post_message(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(request): Json<MessageRequest>,
) -> Json<ReplyResponse> {
    let reply = state.assistant.handle_message(user_id, &request.text).await;
    Json(ReplyResponse::from(reply))
}

pub async fn post_callback(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(request): Json<CallbackRequest>,
) -> Json<ReplyResponse> {
    let reply = state.assistant.handle_callback(user_id, &request.data).await;
    Json(ReplyResponse::from(reply))
}

pub async fn get_progress(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Getting progress for user {}", user_id);

    let progress = state.assistant.progress(user_id).await?;
    Ok(Json(ProgressResponse::new(user_id, progress)))
}
