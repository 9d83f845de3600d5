//! Generation service configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Generation service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// API key. Without one the engine runs on local fallbacks only.
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries for transient failures; each retry is admitted by the governor
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Delay before the first retry, doubled for each later one
    #[serde(default = "default_backoff")]
    pub backoff_millis: u64,

    /// Completion budget for replies
    #[serde(default = "default_max_tokens_reply")]
    pub max_tokens_reply: u32,

    /// Completion budget for classification
    #[serde(default = "default_max_tokens_classify")]
    pub max_tokens_classify: u32,

    /// Sampling temperature for replies
    #[serde(default = "default_temperature_reply")]
    pub temperature_reply: f32,

    /// Sampling temperature for classification; kept low for stable verdicts
    #[serde(default = "default_temperature_classify")]
    pub temperature_classify: f32,
}

impl LlmConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_millis)
    }

    /// Check if an API key is configured
    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Validate generation service configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_http_url(&self.base_url) {
            return Err(ValidationError::InvalidUrl("llm.base_url"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        for (field, value) in [
            ("llm.temperature_reply", self.temperature_reply),
            ("llm.temperature_classify", self.temperature_classify),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(ValidationError::OutOfRange {
                    field,
                    min: 0.0,
                    max: 2.0,
                    actual: f64::from(value),
                });
            }
        }
        Ok(())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            backoff_millis: default_backoff(),
            max_tokens_reply: default_max_tokens_reply(),
            max_tokens_classify: default_max_tokens_classify(),
            temperature_reply: default_temperature_reply(),
            temperature_classify: default_temperature_classify(),
        }
    }
}

pub(super) fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    1
}

fn default_backoff() -> u64 {
    500
}

fn default_max_tokens_reply() -> u32 {
    100
}

fn default_max_tokens_classify() -> u32 {
    200
}

fn default_temperature_reply() -> f32 {
    0.7
}

fn default_temperature_classify() -> f32 {
    0.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_config_defaults() {
        let config = LlmConfig::default();
        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.max_retries, 1);
        assert!(!config.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let config = LlmConfig {
            api_key: Some(SecretString::new("  ".to_string())),
            ..Default::default()
        };
        assert!(!config.is_configured());
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let config = LlmConfig {
            base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidUrl("llm.base_url")));
    }

    #[test]
    fn test_rejects_wild_temperature() {
        let config = LlmConfig {
            temperature_reply: 3.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::OutOfRange { .. })));
    }
}
