// src/config.rs
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_API_VERSION: &str = "2024-02-01";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

pub const ENDPOINT_VAR: &str = "AZURE_OPENAI_ENDPOINT";
pub const KEY_VAR: &str = "AZURE_OPENAI_KEY";
pub const DEPLOYMENT_VAR: &str = "AZURE_OPENAI_DEPLOYMENT_NAME";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidConfig {
    #[error("{var} must be a port number, got {value:?}")]
    Port { var: &'static str, value: String },

    #[error("{var} must be a positive number of seconds, got {value:?}")]
    Timeout { var: &'static str, value: String },
}

/// Everything needed to reach one Azure OpenAI deployment.
#[derive(Clone)]
pub struct AzureSettings {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
}

impl std::fmt::Debug for AzureSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureSettings")
            .field("endpoint", &self.endpoint)
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

/// Process-wide configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub request_timeout: Duration,
    pub system_prompt: String,
    /// `None` when any of the required Azure variables is unset.
    pub azure: Option<AzureSettings>,
    pub missing_azure_vars: Vec<&'static str>,
}

impl Config {
    pub fn from_env() -> Result<Self, InvalidConfig> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, InvalidConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| InvalidConfig::Port { var: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match get("AZURE_OPENAI_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(InvalidConfig::Timeout {
                        var: "AZURE_OPENAI_TIMEOUT_SECS",
                        value,
                    });
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let endpoint = get(ENDPOINT_VAR);
        let api_key = get(KEY_VAR);
        let deployment = get(DEPLOYMENT_VAR);

        let missing_azure_vars: Vec<&'static str> = [
            (ENDPOINT_VAR, endpoint.is_none()),
            (KEY_VAR, api_key.is_none()),
            (DEPLOYMENT_VAR, deployment.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect();

        let azure = match (endpoint, api_key, deployment) {
            (Some(endpoint), Some(api_key), Some(deployment)) => Some(AzureSettings {
                endpoint,
                api_key,
                deployment,
                api_version: get("AZURE_OPENAI_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            port,
            request_timeout: Duration::from_secs(timeout_secs),
            system_prompt: get("CHAT_SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            azure,
            missing_azure_vars,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, InvalidConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert!(config.azure.is_none());
        assert_eq!(
            config.missing_azure_vars,
            vec![ENDPOINT_VAR, KEY_VAR, DEPLOYMENT_VAR]
        );
    }

    #[test]
    fn full_azure_settings() {
        let config = load(&[
            ("PORT", "9000"),
            (ENDPOINT_VAR, "https://example.openai.azure.com"),
            (KEY_VAR, "key"),
            (DEPLOYMENT_VAR, "gpt-4o"),
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        let azure = config.azure.unwrap();
        assert_eq!(azure.deployment, "gpt-4o");
        assert_eq!(azure.api_version, DEFAULT_API_VERSION);
        assert!(config.missing_azure_vars.is_empty());
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let config = load(&[
            (ENDPOINT_VAR, "https://example.openai.azure.com"),
            (KEY_VAR, ""),
            (DEPLOYMENT_VAR, "gpt-4o"),
        ])
        .unwrap();

        assert!(config.azure.is_none());
        assert_eq!(config.missing_azure_vars, vec![KEY_VAR]);
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = load(&[("PORT", "http")]).unwrap_err();
        assert_eq!(
            err,
            InvalidConfig::Port {
                var: "PORT",
                value: "http".to_string()
            }
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(matches!(
            load(&[("AZURE_OPENAI_TIMEOUT_SECS", "0")]),
            Err(InvalidConfig::Timeout { .. })
        ));
    }

    #[test]
    fn api_key_is_not_debug_printed() {
        let config = load(&[
            (ENDPOINT_VAR, "https://example.openai.azure.com"),
            (KEY_VAR, "super-secret"),
            (DEPLOYMENT_VAR, "gpt-4o"),
        ])
        .unwrap();
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
