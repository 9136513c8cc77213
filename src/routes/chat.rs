use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::warn;

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse},
    services::chatbot::generate_reply,
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    // An unreadable body is treated the same as a body without a message.
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected chat request body");
            ChatRequest::default()
        }
    };

    let reply = generate_reply(state.completions.as_ref(), &state.config, payload.message()).await?;

    Ok(Json(ChatResponse { reply }))
}
