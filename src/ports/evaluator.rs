//! Evaluator Port - delivery of completion summaries.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::completion::CompletionSummary;

/// Port for the external evaluator endpoint.
#[async_trait]
pub trait EvaluatorClient: Send + Sync {
    /// Delivers a summary. Implementations own their retry policy; an `Err`
    /// means delivery was abandoned.
    async fn deliver(&self, summary: &CompletionSummary) -> Result<(), DeliveryError>;
}

/// Why a summary did not reach the evaluator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// The evaluator did not answer within the client timeout.
    #[error("Evaluator timed out after {0:?}")]
    Timeout(Duration),

    /// Connection refused, DNS failure and the like.
    #[error("Evaluator unreachable: {0}")]
    Transport(String),

    /// Non-2xx response.
    #[error("Evaluator rejected summary with status {0}")]
    Status(u16),

    #[error("Failed to encode summary: {0}")]
    Encoding(String),
}

impl DeliveryError {
    /// Client errors other than 408/429 will not improve on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            DeliveryError::Timeout(_) | DeliveryError::Transport(_) => true,
            DeliveryError::Status(status) => *status == 408 || *status == 429 || *status >= 500,
            DeliveryError::Encoding(_) => false,
        }
    }
}
