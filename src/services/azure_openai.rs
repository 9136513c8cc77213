// src/services/azure_openai.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::AzureSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: MessageRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: MessageRole::User, content: content.into() }
    }
}

#[derive(Debug, Error)]
pub enum CompletionError {
    /// Connection, TLS, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {status}: {detail}")]
    Status { status: StatusCode, detail: String },

    #[error("{0}")]
    Format(String),
}

/// Source of chat completions. The handler only talks to this trait.
#[async_trait]
pub trait ChatCompletions: Send + Sync {
    /// Returns the content of the first completion choice.
    async fn complete(
        &self,
        settings: &AzureSettings,
        messages: &[ChatMessage],
    ) -> Result<String, CompletionError>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionPayload {
    choices: Option<Vec<Choice>>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<AssistantMessage>,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

/// Azure OpenAI chat completions over REST.
#[derive(Debug, Clone)]
pub struct AzureOpenAiClient {
    http: Client,
}

impl AzureOpenAiClient {
    pub fn new(timeout: Duration) -> Result<Self, CompletionError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    fn completions_url(settings: &AzureSettings) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            settings.endpoint.trim_end_matches('/'),
            settings.deployment,
            settings.api_version
        )
    }
}

#[async_trait]
impl ChatCompletions for AzureOpenAiClient {
    async fn complete(
        &self,
        settings: &AzureSettings,
        messages: &[ChatMessage],
    ) -> Result<String, CompletionError> {
        let url = Self::completions_url(settings);
        debug!(deployment = %settings.deployment, "posting chat completion request");

        let response = self
            .http
            .post(url)
            .header("api-key", &settings.api_key)
            .json(&CompletionRequest { messages })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status,
                detail: describe_error_body(&body),
            });
        }

        let bytes = response.bytes().await?;
        parse_reply(&bytes)
    }
}

/// Pulls `choices[0].message.content` out of a completion body.
pub fn parse_reply(body: &[u8]) -> Result<String, CompletionError> {
    let payload: CompletionPayload = serde_json::from_slice(body)
        .map_err(|e| CompletionError::Format(format!("invalid completion body: {e}")))?;

    let choice = payload
        .choices
        .ok_or_else(|| CompletionError::Format("missing choices".to_string()))?
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::Format("empty choices".to_string()))?;

    choice
        .message
        .ok_or_else(|| CompletionError::Format("choice has no message".to_string()))?
        .content
        .ok_or_else(|| CompletionError::Format("message has no content".to_string()))
}

/// Renders an upstream error body for logs, preferring the structured
/// `{"error": {"code", "message"}}` envelope.
pub fn describe_error_body(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => match (error.code, error.message) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (None, Some(message)) => message,
            (Some(code), None) => code,
            (None, None) => body.to_string(),
        },
        Err(_) if body.is_empty() => "<empty body>".to_string(),
        Err(_) => body.to_string(),
    }
}
