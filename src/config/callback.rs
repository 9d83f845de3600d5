//! Evaluator callback configuration

use serde::Deserialize;
use std::time::Duration;

use crate::adapters::callback::HttpEvaluatorConfig;

use super::error::ValidationError;
use super::llm::is_http_url;

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackConfig {
    /// Evaluator endpoint receiving completion summaries
    #[serde(default = "default_url")]
    pub url: String,

    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries after the first attempt
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Delay before the first retry, doubled for each later one
    #[serde(default = "default_backoff")]
    pub backoff_millis: u64,
}

impl CallbackConfig {
    pub fn evaluator_config(&self) -> HttpEvaluatorConfig {
        HttpEvaluatorConfig::new(self.url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_retries(self.max_retries)
            .with_backoff(Duration::from_millis(self.backoff_millis))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_http_url(&self.url) {
            return Err(ValidationError::InvalidUrl("callback.url"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            backoff_millis: default_backoff(),
        }
    }
}

fn default_url() -> String {
    "https://hackathon.guvi.in/api/updateHoneyPotFinalResult".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_retries() -> u32 {
    2
}

fn default_backoff() -> u64 {
    500
}
