// src/services/chatbot.rs
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::AppError;
use crate::services::azure_openai::{ChatCompletions, ChatMessage};

/// The conversation sent upstream: the system instruction, then the user's
/// message untouched. Nothing is carried over between requests.
pub fn build_conversation(system_prompt: &str, message: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::system(system_prompt), ChatMessage::user(message)]
}

/// Relays one message to the configured deployment and returns the reply
/// exactly as the model produced it.
pub async fn generate_reply(
    completions: &dyn ChatCompletions,
    config: &Config,
    message: Option<&str>,
) -> Result<String, AppError> {
    let Some(message) = message.filter(|m| !m.is_empty()) else {
        return Err(AppError::BadRequest("message is missing or empty".to_string()));
    };

    let Some(settings) = config.azure.as_ref() else {
        let err = AppError::Configuration(config.missing_azure_vars.clone());
        error!(error = %err, "Server configuration error");
        return Err(err);
    };

    let conversation = build_conversation(&config.system_prompt, message);

    info!(deployment = %settings.deployment, chars = message.chars().count(), "Sending request to Azure OpenAI");
    debug!(user_message = message, "forwarding user message");

    match completions.complete(settings, &conversation).await {
        Ok(reply) => {
            info!("Received response from Azure OpenAI");
            Ok(reply)
        }
        Err(err) => {
            error!(error = %err, "Error calling Azure OpenAI");
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AzureSettings;
    use crate::services::azure_openai::{CompletionError, MessageRole};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct Recording {
        seen: Mutex<Vec<Vec<ChatMessage>>>,
        outcome: fn() -> Result<String, CompletionError>,
    }

    impl Recording {
        fn new(outcome: fn() -> Result<String, CompletionError>) -> Self {
            Self { seen: Mutex::new(Vec::new()), outcome }
        }
    }

    #[async_trait]
    impl ChatCompletions for Recording {
        async fn complete(
            &self,
            _settings: &AzureSettings,
            messages: &[ChatMessage],
        ) -> Result<String, CompletionError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            (self.outcome)()
        }
    }

    fn configured() -> Config {
        Config {
            port: 8080,
            request_timeout: Duration::from_secs(5),
            system_prompt: "You are a helpful AI assistant.".to_string(),
            azure: Some(AzureSettings {
                endpoint: "http://localhost".into(),
                api_key: "key".into(),
                deployment: "gpt".into(),
                api_version: "2024-02-01".into(),
            }),
            missing_azure_vars: vec![],
        }
    }

    #[test]
    fn conversation_is_system_then_user() {
        let conversation = build_conversation("sys", "hello");
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation[0].role, MessageRole::System);
        assert_eq!(conversation[0].content, "sys");
        assert_eq!(conversation[1].role, MessageRole::User);
        assert_eq!(conversation[1].content, "hello");
    }

    #[tokio::test]
    async fn empty_message_never_reaches_upstream() {
        let upstream = Recording::new(|| Ok("unused".into()));
        let err = generate_reply(&upstream, &configured(), Some("")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(upstream.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_settings_fail_before_the_call() {
        let upstream = Recording::new(|| Ok("unused".into()));
        let mut config = configured();
        config.azure = None;
        config.missing_azure_vars = vec!["AZURE_OPENAI_KEY"];

        let err = generate_reply(&upstream, &config, Some("hi")).await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(ref vars) if vars.as_slice() == ["AZURE_OPENAI_KEY"]));
        assert!(upstream.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reply_is_passed_through() {
        let upstream = Recording::new(|| Ok("Hi there!".into()));
        let reply = generate_reply(&upstream, &configured(), Some("Hello")).await.unwrap();
        assert_eq!(reply, "Hi there!");

        let seen = upstream.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0][1].content, "Hello");
    }

    #[tokio::test]
    async fn upstream_failures_keep_their_kind() {
        let upstream = Recording::new(|| Err(CompletionError::Format("empty choices".into())));
        let err = generate_reply(&upstream, &configured(), Some("hi")).await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamFormat(_)));
    }
}
