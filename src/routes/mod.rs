// src/routes/mod.rs
pub mod chat;

use crate::state::SharedState;
use axum::{
    Router,
    body::Body,
    http::Request,
    routing::{get, post},
};
use chat::chat_handler;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub fn create_router() -> Router<SharedState> {
    let trace = TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
        tracing::info_span!(
            "http",
            request_id = %Uuid::new_v4(),
            method = %req.method(),
            uri = %req.uri(),
        )
    });

    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/health", get(|| async { "OK" }))
        .layer(trace)
        .layer(CorsLayer::very_permissive())
}
