//! Scripted generator for tests.
//!
//! Classification and reply calls draw from separate queues so a test can
//! script a whole conversation up front. When a queue runs dry the
//! generator falls back to its defaults.
//!
//! # Example
//!
//! ```ignore
//! let generator = MockGenerator::new()
//!     .with_classification(Classification::new(true, 0.9, FraudCategory::BankFraud, Urgency::High))
//!     .with_reply("Oh no! What should I do?");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::detection::Classification;
use crate::ports::{
    GeneratedContent, GenerationFailure, GenerationOutcome, GenerationRequest, GenerationTask,
    TextGenerator,
};

const DEFAULT_MOCK_REPLY: &str = "Oh dear, what exactly do I need to do?";

/// Mock text generator.
#[derive(Debug, Clone)]
pub struct MockGenerator {
    classifications: Arc<Mutex<VecDeque<GenerationOutcome>>>,
    replies: Arc<Mutex<VecDeque<GenerationOutcome>>>,
    default_classification: Option<Classification>,
    default_reply: Option<String>,
    delay: Duration,
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockGenerator {
    /// Unscripted classification calls fail; unscripted reply calls succeed
    /// with a stock line. Without a default, the last scripted outcome of a
    /// queue repeats.
    pub fn new() -> Self {
        Self {
            classifications: Arc::new(Mutex::new(VecDeque::new())),
            replies: Arc::new(Mutex::new(VecDeque::new())),
            default_classification: None,
            default_reply: Some(DEFAULT_MOCK_REPLY.to_string()),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A generator whose every call fails with `failure`.
    pub fn failing(failure: GenerationFailure) -> Self {
        let mut mock = Self::new();
        mock.default_reply = None;
        mock.with_failure(GenerationTask::Classify, failure.clone())
            .with_failure(GenerationTask::Reply, failure)
    }

    /// Queues one classification result.
    pub fn with_classification(self, classification: Classification) -> Self {
        self.push(GenerationTask::Classify, GenerationOutcome::Success(GeneratedContent::classification(classification)));
        self
    }

    /// Queues one reply.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push(GenerationTask::Reply, GenerationOutcome::Success(GeneratedContent::reply(reply)));
        self
    }

    /// Queues one failure for the given task.
    pub fn with_failure(self, task: GenerationTask, failure: GenerationFailure) -> Self {
        self.push(task, GenerationOutcome::Failure(failure));
        self
    }

    /// Classification returned once the queue is empty.
    pub fn with_default_classification(mut self, classification: Classification) -> Self {
        self.default_classification = Some(classification);
        self
    }

    /// Reply returned once the queue is empty.
    pub fn with_default_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_reply = Some(reply.into());
        self
    }

    /// Simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn push(&self, task: GenerationTask, outcome: GenerationOutcome) {
        self.queue(task).lock().unwrap().push_back(outcome);
    }

    fn queue(&self, task: GenerationTask) -> &Arc<Mutex<VecDeque<GenerationOutcome>>> {
        match task {
            GenerationTask::Classify => &self.classifications,
            GenerationTask::Reply => &self.replies,
        }
    }

    fn next_outcome(&self, task: GenerationTask) -> GenerationOutcome {
        let mut queue = self.queue(task).lock().unwrap();
        let default = match task {
            GenerationTask::Classify => self
                .default_classification
                .clone()
                .map(|c| GenerationOutcome::Success(GeneratedContent::classification(c))),
            GenerationTask::Reply => self
                .default_reply
                .clone()
                .map(|r| GenerationOutcome::Success(GeneratedContent::reply(r))),
        };

        let unscripted = || GenerationOutcome::Failure(GenerationFailure::Unconfigured);
        match (queue.len(), default) {
            (0, Some(default)) => default,
            (0, None) => unscripted(),
            (1, None) => queue.front().cloned().unwrap_or_else(unscripted),
            _ => queue.pop_front().unwrap_or_else(unscripted),
        }
    }

    /// Every request received, in order.
    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Number of calls made for the given task.
    pub fn calls_for(&self, task: GenerationTask) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.task == task)
            .count()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, request: GenerationRequest) -> GenerationOutcome {
        let task = request.task;
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        self.next_outcome(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::detection::{FraudCategory, Urgency};
    use crate::domain::foundation::SessionId;
    use crate::ports::RequestMetadata;

    fn request(task: GenerationTask) -> GenerationRequest {
        GenerationRequest::new(task, "hello", RequestMetadata::new(SessionId::new("mock").unwrap()))
    }

    #[tokio::test]
    async fn replays_scripted_replies_in_order_then_default() {
        let mock = MockGenerator::new().with_reply("first").with_reply("second");

        let mut texts = Vec::new();
        for _ in 0..3 {
            match mock.generate(request(GenerationTask::Reply)).await {
                GenerationOutcome::Success(content) => texts.push(content.reply),
                GenerationOutcome::Failure(f) => panic!("unexpected failure: {}", f),
            }
        }

        assert_eq!(texts, vec!["first", "second", DEFAULT_MOCK_REPLY]);
    }

    #[tokio::test]
    async fn unscripted_classification_fails() {
        let mock = MockGenerator::new();
        let outcome = mock.generate(request(GenerationTask::Classify)).await;
        assert!(matches!(outcome, GenerationOutcome::Failure(GenerationFailure::Unconfigured)));
    }

    #[tokio::test]
    async fn queues_are_independent() {
        let classification = Classification::new(true, 0.9, FraudCategory::BankFraud, Urgency::High);
        let mock = MockGenerator::new()
            .with_classification(classification.clone())
            .with_reply("reply");

        let reply = mock.generate(request(GenerationTask::Reply)).await;
        let verdict = mock.generate(request(GenerationTask::Classify)).await;

        match (reply, verdict) {
            (GenerationOutcome::Success(r), GenerationOutcome::Success(v)) => {
                assert_eq!(r.reply, "reply");
                assert_eq!(v.classification, Some(classification));
            }
            other => panic!("unexpected outcomes: {:?}", other),
        }
        assert_eq!(mock.calls_for(GenerationTask::Classify), 1);
        assert_eq!(mock.calls_for(GenerationTask::Reply), 1);
    }

    #[tokio::test]
    async fn failing_mock_keeps_failing() {
        let mock = MockGenerator::failing(GenerationFailure::transport("down"));
        for _ in 0..3 {
            let outcome = mock.generate(request(GenerationTask::Reply)).await;
            assert!(matches!(outcome, GenerationOutcome::Failure(GenerationFailure::Transport(_))));
        }
        assert_eq!(mock.call_count(), 3);
    }
}
