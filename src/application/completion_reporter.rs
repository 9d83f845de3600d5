//! CompletionReporter - hands summaries to the evaluator off the request path.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::domain::completion::CompletionSummary;
use crate::ports::EvaluatorClient;

use super::metrics::EngineMetrics;

/// Delivers completion summaries in the background.
///
/// The caller's reply never waits on delivery. Delivery failures are logged
/// by the evaluator client and never reopen the session.
#[derive(Clone)]
pub struct CompletionReporter {
    evaluator: Arc<dyn EvaluatorClient>,
    metrics: Arc<EngineMetrics>,
}

impl CompletionReporter {
    pub fn new(evaluator: Arc<dyn EvaluatorClient>, metrics: Arc<EngineMetrics>) -> Self {
        Self { evaluator, metrics }
    }

    /// Delivers one summary and waits for the outcome.
    pub async fn report(&self, summary: CompletionSummary) {
        self.metrics.record_completion(summary.intelligence.total_items());

        tracing::info!(
            session_id = %summary.session_id,
            total_messages = summary.total_messages,
            items = summary.intelligence.total_items(),
            notes = %summary.notes,
            "Reporting completed session"
        );

        if let Err(e) = self.evaluator.deliver(&summary).await {
            tracing::error!(
                session_id = %summary.session_id,
                error = %e,
                "Completion summary was not delivered"
            );
        }
    }

    /// Spawns [`report`](Self::report) on the runtime.
    pub fn dispatch(&self, summary: CompletionSummary) -> JoinHandle<()> {
        let reporter = self.clone();
        tokio::spawn(async move { reporter.report(summary).await })
    }
}
