// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::message::ErrorResponse;
use crate::services::azure_openai::CompletionError;

pub const MESSAGE_REQUIRED: &str = "Message is required";
pub const CONFIGURATION_ERROR: &str = "Server configuration error";
pub const PARSE_FAILURE: &str = "Failed to parse AI response";
pub const UPSTREAM_FAILURE: &str = "Failed to get response from AI";

/// Failures of a single chat request. The `Display` text is for logs; the
/// client only ever sees the fixed strings above.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("missing configuration: {}", .0.join(", "))]
    Configuration(Vec<&'static str>),

    #[error("malformed completion: {0}")]
    UpstreamFormat(String),

    #[error("completion request failed: {0}")]
    Upstream(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => MESSAGE_REQUIRED,
            AppError::Configuration(_) => CONFIGURATION_ERROR,
            AppError::UpstreamFormat(_) => PARSE_FAILURE,
            AppError::Upstream(_) => UPSTREAM_FAILURE,
        }
    }
}

impl From<CompletionError> for AppError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::Format(detail) => AppError::UpstreamFormat(detail),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.public_message().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
