use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::domain::completion::CompletionSummary;
use crate::ports::{DeliveryError, EvaluatorClient};

/// In-memory evaluator that keeps every summary it is handed.
///
/// Optionally fails every delivery, to exercise the failure path.
#[derive(Debug, Clone, Default)]
pub struct RecordingEvaluator {
    delivered: Arc<Mutex<Vec<CompletionSummary>>>,
    attempts: Arc<Mutex<usize>>,
    fail_with: Option<DeliveryError>,
}

impl RecordingEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delivery fails with `error`.
    pub fn failing(error: DeliveryError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }

    /// Summaries successfully delivered, in order.
    pub fn delivered(&self) -> Vec<CompletionSummary> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }

    /// Deliveries attempted, including failed ones.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl EvaluatorClient for RecordingEvaluator {
    async fn deliver(&self, summary: &CompletionSummary) -> Result<(), DeliveryError> {
        *self.attempts.lock().unwrap() += 1;
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        self.delivered.lock().unwrap().push(summary.clone());
        Ok(())
    }
}
