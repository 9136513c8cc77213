// src/message.rs
use serde::{Deserialize, Serialize};

/// Inbound body of `POST /api/chat`.
///
/// `message` is optional at the schema level so that `{}` reaches the handler
/// and gets the regular "Message is required" answer instead of a framework
/// rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatRequest {
    /// The message, if present and non-empty. No trimming is applied.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
