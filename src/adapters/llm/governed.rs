//! Generator wrapper that enforces quota admission, a per-call deadline and
//! bounded retries around any other generator.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::ports::{GenerationFailure, GenerationOutcome, GenerationRequest, QuotaGate, TextGenerator};

/// Retry behavior for retryable failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each later one.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self { max_retries, backoff }
    }

    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    fn delay_before(&self, retry: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(retry))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1, Duration::from_millis(500))
    }
}

/// Every call through this wrapper is admitted by the quota gate first and
/// recorded at dispatch. Retries are admitted and recorded like fresh calls.
pub struct GovernedGenerator {
    inner: Arc<dyn TextGenerator>,
    gate: Arc<dyn QuotaGate>,
    call_timeout: Duration,
    retry: RetryPolicy,
}

impl GovernedGenerator {
    pub fn new(inner: Arc<dyn TextGenerator>, gate: Arc<dyn QuotaGate>, call_timeout: Duration) -> Self {
        Self {
            inner,
            gate,
            call_timeout,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn attempt(&self, request: &GenerationRequest) -> GenerationOutcome {
        match timeout(self.call_timeout, self.inner.generate(request.clone())).await {
            Ok(outcome) => outcome,
            Err(_) => GenerationOutcome::Failure(GenerationFailure::Timeout(self.call_timeout)),
        }
    }
}

#[async_trait]
impl TextGenerator for GovernedGenerator {
    async fn generate(&self, request: GenerationRequest) -> GenerationOutcome {
        let tokens = request.estimated_tokens();
        let session_id = request.metadata.session_id.clone();
        let request_id = request.metadata.request_id;
        let task = request.task.as_str();
        let mut retries = 0;

        loop {
            if let Err(exceeded) = self.gate.acquire(tokens).await {
                tracing::warn!(
                    session_id = %session_id,
                    request_id = %request_id,
                    task,
                    wait_ms = exceeded.wait.as_millis() as u64,
                    "Generation call rejected by quota gate"
                );
                return GenerationOutcome::Failure(GenerationFailure::QuotaExceeded {
                    wait: exceeded.wait,
                    ceiling: exceeded.ceiling,
                });
            }

            match self.attempt(&request).await {
                GenerationOutcome::Failure(failure)
                    if failure.is_retryable() && retries < self.retry.max_retries =>
                {
                    let delay = self.retry.delay_before(retries);
                    tracing::warn!(
                        session_id = %session_id,
                        request_id = %request_id,
                        task,
                        attempt = retries + 1,
                        error = %failure,
                        "Generation call failed, retrying in {:?}",
                        delay
                    );
                    retries += 1;
                    sleep(delay).await;
                }
                GenerationOutcome::Failure(failure) => {
                    tracing::warn!(
                        session_id = %session_id,
                        request_id = %request_id,
                        task,
                        kind = failure.kind(),
                        error = %failure,
                        "Generation call failed"
                    );
                    return GenerationOutcome::Failure(failure);
                }
                success => return success,
            }
        }
    }
}
