//! Chat routes

use axum::{
    Router,
    routing::{get, post},
};

use crate::api::app_state::AppState;
use crate::api::handlers::chat_handler::*;

pub fn create_chat_router() -> Router<AppState> {
    Router::new()
        .route("/chats/:user_id/messages", post(post_message))
        .route("/chats/:user_id/callbacks", post(post_callback))
        .route("/users/:user_id/progress", get(get_progress))
}
