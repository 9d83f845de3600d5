//! HTTP evaluator client.
//!
//! Delivery is best effort: a failed attempt is retried with exponential
//! backoff up to `max_retries` times, then abandoned.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::completion::CompletionSummary;
use crate::ports::{DeliveryError, EvaluatorClient};

/// Endpoint and retry settings.
#[derive(Debug, Clone)]
pub struct HttpEvaluatorConfig {
    pub url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each later one.
    pub backoff: Duration,
}

impl HttpEvaluatorConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(10),
            max_retries: 2,
            backoff: Duration::from_millis(500),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

pub struct HttpEvaluatorClient {
    config: HttpEvaluatorConfig,
    client: Client,
}

impl HttpEvaluatorClient {
    pub fn new(config: HttpEvaluatorConfig) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DeliveryError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    async fn post_once(&self, body: &[u8]) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.config.url)
            .header("Content-Type", "application/json")
            .body(body.to_vec())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::Timeout(self.config.timeout)
                } else {
                    DeliveryError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DeliveryError::Status(status.as_u16()))
        }
    }
}

#[async_trait]
impl EvaluatorClient for HttpEvaluatorClient {
    async fn deliver(&self, summary: &CompletionSummary) -> Result<(), DeliveryError> {
        let body = serde_json::to_vec(summary).map_err(|e| DeliveryError::Encoding(e.to_string()))?;
        let mut retry_count = 0;

        loop {
            match self.post_once(&body).await {
                Ok(()) => {
                    tracing::info!(
                        session_id = %summary.session_id,
                        attempts = retry_count + 1,
                        "Completion summary delivered"
                    );
                    return Ok(());
                }
                Err(err) if err.is_retryable() && retry_count < self.config.max_retries => {
                    tracing::warn!(
                        session_id = %summary.session_id,
                        attempt = retry_count + 1,
                        error = %err,
                        "Evaluator delivery attempt failed"
                    );
                    // Exponential backoff: 500ms, 1s, 2s, ...
                    let delay = self.config.backoff.saturating_mul(1 << retry_count.min(16));
                    sleep(delay).await;
                    retry_count += 1;
                }
                Err(err) => {
                    tracing::error!(
                        session_id = %summary.session_id,
                        attempts = retry_count + 1,
                        error = %err,
                        "Evaluator delivery abandoned"
                    );
                    return Err(err);
                }
            }
        }
    }
}
