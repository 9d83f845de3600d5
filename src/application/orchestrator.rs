//! ConversationOrchestrator - the per-message pipeline.
//!
//! One inbound message runs through these steps while the session's lock is
//! held:
//!
//! 1. Fetch or create the session, append the message, count the turn.
//! 2. While observing, classify the message and present the verdict to the
//!    detection gate. On activation, assign a persona.
//! 3. Once engaged, mine counterparty text for intelligence.
//! 4. Derive the dialogue stage.
//! 5. Generate the persona's reply, or fall back to a fixed line.
//! 6. Record the reply and persist the session.
//! 7. Evaluate completion and hand the summary to the reporter.
//!
//! The turn runs on its own task so a caller that disconnects mid-turn does
//! not lose the session mutation.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::domain::completion::{CompletionPolicy, CompletionSummary, CompletionTrigger};
use crate::domain::conversation::{fallback_reply, DialogueStage, NEUTRAL_REPLY};
use crate::domain::detection::{
    Classification, DetectionGate, GateDecision, KeywordFallbackClassifier,
    DEFAULT_DETECTION_THRESHOLD,
};
use crate::domain::foundation::SessionId;
use crate::domain::intelligence::IntelligenceExtractor;
use crate::domain::persona::PersonaAssignor;
use crate::domain::session::{Message, Session};
use crate::ports::{
    Clock, GeneratedContent, GenerationOutcome, GenerationRequest, GenerationTask,
    RequestMetadata, SessionStore, TextGenerator,
};

use super::completion_reporter::CompletionReporter;
use super::metrics::EngineMetrics;
use super::prompts::{reply_context, CLASSIFY_INSTRUCTIONS};

/// Tunables for the pipeline.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub detection_threshold: f64,
    pub completion: CompletionPolicy,
    /// Messages of prior history handed to reply generation.
    pub history_window: usize,
    pub reply_max_tokens: u32,
    pub reply_temperature: f32,
    pub classify_max_tokens: u32,
    pub classify_temperature: f32,
    /// Longest a caller waits for a turn. Past it the caller gets a fallback
    /// reply while the turn finishes in the background.
    pub turn_deadline: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            detection_threshold: DEFAULT_DETECTION_THRESHOLD,
            completion: CompletionPolicy::default(),
            history_window: 5,
            reply_max_tokens: 100,
            reply_temperature: 0.7,
            classify_max_tokens: 200,
            classify_temperature: 0.1,
            turn_deadline: Duration::from_secs(25),
        }
    }
}

/// One inbound message as handed over by the transport.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub session_id: SessionId,
    pub message: Message,
    /// History as the caller sees it. Only its length is used, as context
    /// for classification.
    pub conversation_history: Vec<Message>,
    pub channel: Option<String>,
}

/// What a turn produced.
#[derive(Debug)]
pub struct TurnOutcome {
    pub reply: String,
    pub engaged: bool,
    pub stage: DialogueStage,
    /// Set on the one turn that completed the session.
    pub completion: Option<CompletionTrigger>,
    /// Background delivery of the completion summary, if one was started.
    pub delivery: Option<JoinHandle<()>>,
}

impl TurnOutcome {
    fn neutral() -> Self {
        Self {
            reply: NEUTRAL_REPLY.to_string(),
            engaged: false,
            stage: DialogueStage::default(),
            completion: None,
            delivery: None,
        }
    }
}

/// Composes the domain services and ports into the message pipeline.
#[derive(Clone)]
pub struct ConversationOrchestrator {
    store: Arc<dyn SessionStore>,
    generator: Arc<dyn TextGenerator>,
    clock: Arc<dyn Clock>,
    reporter: CompletionReporter,
    metrics: Arc<EngineMetrics>,
    assignor: Arc<PersonaAssignor>,
    classifier: Arc<KeywordFallbackClassifier>,
    extractor: IntelligenceExtractor,
    gate: DetectionGate,
    settings: OrchestratorSettings,
}

impl ConversationOrchestrator {
    pub fn new(
        store: Arc<dyn SessionStore>,
        generator: Arc<dyn TextGenerator>,
        clock: Arc<dyn Clock>,
        reporter: CompletionReporter,
        metrics: Arc<EngineMetrics>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            store,
            generator,
            clock,
            reporter,
            metrics,
            assignor: Arc::new(PersonaAssignor::new()),
            classifier: Arc::new(KeywordFallbackClassifier::new()),
            extractor: IntelligenceExtractor::new(),
            gate: DetectionGate::new(settings.detection_threshold),
            settings,
        }
    }

    /// Replaces the persona assignor, e.g. with a seeded one.
    pub fn with_assignor(mut self, assignor: PersonaAssignor) -> Self {
        self.assignor = Arc::new(assignor);
        self
    }

    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Handles one inbound message and returns the reply to send back.
    ///
    /// Never fails from the caller's point of view: every upstream failure is
    /// absorbed by a local fallback.
    pub async fn handle_message(&self, inbound: InboundMessage) -> TurnOutcome {
        let session_id = inbound.session_id.clone();
        let orchestrator = self.clone();

        let mut turn = tokio::spawn(async move { orchestrator.run_turn(inbound).await });

        match timeout(self.settings.turn_deadline, &mut turn).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                tracing::error!(session_id = %session_id, error = %e, "Turn task failed");
                TurnOutcome::neutral()
            }
            Err(_) => {
                // Dropping the handle detaches the turn; it still saves.
                tracing::warn!(
                    session_id = %session_id,
                    deadline_ms = self.settings.turn_deadline.as_millis() as u64,
                    "Turn missed its deadline, replying with a fallback"
                );
                self.deadline_outcome(&session_id).await
            }
        }
    }

    /// Reply for a caller whose turn is still running, based on the last
    /// saved state of the session.
    async fn deadline_outcome(&self, session_id: &SessionId) -> TurnOutcome {
        match self.store.get(session_id).await {
            Some(session) if session.is_engaged() => TurnOutcome {
                reply: self.fallback(&session),
                engaged: true,
                stage: DialogueStage::derive(
                    session.message_count(),
                    session.intelligence().has_any_intelligence(),
                ),
                completion: None,
                delivery: None,
            },
            _ => TurnOutcome::neutral(),
        }
    }

    async fn run_turn(&self, inbound: InboundMessage) -> TurnOutcome {
        let InboundMessage {
            session_id,
            message,
            conversation_history,
            channel,
        } = inbound;

        let _guard = self.store.lock(&session_id).await;

        let (mut session, created) = self.store.get_or_create(&session_id).await;
        if created {
            self.metrics.record_session_created();
        }

        let from_counterparty = message.is_from_counterparty();
        let text = message.text().to_string();
        session.receive(message);
        self.metrics.record_inbound_message();

        if from_counterparty && !session.is_engaged() {
            let classification = self
                .classify(&session_id, &text, conversation_history.len(), channel.as_deref())
                .await;
            self.apply_gate(&mut session, &classification);
        }

        if from_counterparty && session.is_engaged() {
            let partial = self.extractor.extract(&text);
            let added = session.merge_intelligence(&partial);
            if added > 0 {
                tracing::info!(
                    session_id = %session_id,
                    added,
                    score = session.intelligence_score(),
                    "Intelligence extracted"
                );
            }
        }

        let stage = DialogueStage::derive(
            session.message_count(),
            session.intelligence().has_any_intelligence(),
        );

        let reply = if session.is_engaged() {
            self.persona_reply(&mut session, &text, stage).await
        } else {
            NEUTRAL_REPLY.to_string()
        };

        if let Err(e) = session.record_reply(reply.as_str(), self.clock.now()) {
            tracing::warn!(session_id = %session_id, error = %e, "Reply not recorded");
        }

        let engaged = session.is_engaged();
        let trigger = self.settings.completion.evaluate(&session);
        self.store.save(session.clone()).await;

        let (completion, delivery) = match trigger {
            Some(trigger) => self.complete(&mut session, trigger).await,
            None => (None, None),
        };

        tracing::debug!(
            session_id = %session_id,
            stage = %stage,
            engaged,
            message_count = session.message_count(),
            "Turn handled"
        );

        TurnOutcome {
            reply,
            engaged,
            stage,
            completion,
            delivery,
        }
    }

    /// Asks the service for a verdict, falling back to the keyword heuristic.
    async fn classify(
        &self,
        session_id: &SessionId,
        text: &str,
        prior_messages: usize,
        channel: Option<&str>,
    ) -> Classification {
        let mut request = GenerationRequest::new(
            GenerationTask::Classify,
            text,
            RequestMetadata::new(session_id.clone()),
        )
        .with_system_context(CLASSIFY_INSTRUCTIONS)
        .with_prior_message_count(prior_messages)
        .with_max_tokens(self.settings.classify_max_tokens)
        .with_temperature(self.settings.classify_temperature);
        if let Some(channel) = channel {
            request = request.with_channel(channel);
        }

        match self.generator.generate(request).await {
            GenerationOutcome::Success(GeneratedContent {
                classification: Some(classification),
                ..
            }) => classification,
            GenerationOutcome::Success(_) => {
                tracing::warn!(session_id = %session_id, "Classification missing from result, using keyword fallback");
                self.classifier.classify(text)
            }
            GenerationOutcome::Failure(failure) => {
                tracing::warn!(
                    session_id = %session_id,
                    kind = failure.kind(),
                    "Classification failed, using keyword fallback"
                );
                self.classifier.classify(text)
            }
        }
    }

    fn apply_gate(&self, session: &mut Session, classification: &Classification) {
        match self.gate.apply(session, classification) {
            GateDecision::Activated => {
                self.metrics.record_fraud_detected();
                let persona = self
                    .assignor
                    .assign(&classification.category, classification.urgency);
                session.assign_persona(persona);
                tracing::info!(
                    session_id = %session.id(),
                    category = %classification.category,
                    confidence = classification.confidence,
                    persona = %persona,
                    "Fraud detected, session engaged"
                );
            }
            GateDecision::Observing => {
                tracing::debug!(
                    session_id = %session.id(),
                    is_fraud = classification.is_fraud,
                    confidence = classification.confidence,
                    "Verdict below gate, still observing"
                );
            }
            GateDecision::AlreadyEngaged => {}
        }
    }

    async fn persona_reply(&self, session: &mut Session, text: &str, stage: DialogueStage) -> String {
        let persona = session.persona();
        let profile = persona.and_then(|p| self.assignor.profile(p));

        // The inbound message is the last entry; history is what preceded it.
        let messages = session.messages();
        let prior = &messages[..messages.len().saturating_sub(1)];
        let start = prior.len().saturating_sub(self.settings.history_window);

        let mut request = GenerationRequest::new(
            GenerationTask::Reply,
            text,
            RequestMetadata::new(session.id().clone()),
        )
        .with_stage_guidance(stage.guidance())
        .with_history(prior[start..].to_vec())
        .with_max_tokens(self.settings.reply_max_tokens)
        .with_temperature(self.settings.reply_temperature);
        if let (Some(persona), Some(profile)) = (persona, profile) {
            request = request
                .with_persona(persona)
                .with_system_context(reply_context(profile, session.intelligence()));
        }

        match self.generator.generate(request).await {
            GenerationOutcome::Success(content) if !content.reply.trim().is_empty() => {
                if let Some(hints) = &content.extracted_hints {
                    session.merge_intelligence(hints);
                }
                content.reply.trim().to_string()
            }
            GenerationOutcome::Success(_) => {
                tracing::warn!(session_id = %session.id(), "Empty reply generated, using fallback");
                self.fallback(session)
            }
            GenerationOutcome::Failure(failure) => {
                tracing::warn!(
                    session_id = %session.id(),
                    kind = failure.kind(),
                    stage = %stage,
                    "Reply generation failed, using fallback"
                );
                self.fallback(session)
            }
        }
    }

    fn fallback(&self, session: &Session) -> String {
        self.metrics.record_fallback_reply();
        fallback_reply(session.persona(), session.message_count()).to_string()
    }

    /// Flips the completion flag and starts delivery. Only the caller that
    /// wins the flag reports.
    async fn complete(
        &self,
        session: &mut Session,
        trigger: CompletionTrigger,
    ) -> (Option<CompletionTrigger>, Option<JoinHandle<()>>) {
        match self.store.try_mark_completed(session.id()).await {
            Ok(true) => {
                session.mark_completed();
                tracing::info!(
                    session_id = %session.id(),
                    trigger = ?trigger,
                    message_count = session.message_count(),
                    score = session.intelligence_score(),
                    "Session completed"
                );
                let summary = CompletionSummary::from_session(session);
                (Some(trigger), Some(self.reporter.dispatch(summary)))
            }
            Ok(false) => (None, None),
            Err(e) => {
                tracing::error!(session_id = %session.id(), error = %e, "Failed to mark session completed");
                (None, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::callback::RecordingEvaluator;
    use crate::adapters::clock::ManualClock;
    use crate::adapters::llm::{MockGenerator, UnconfiguredGenerator};
    use crate::adapters::storage::InMemorySessionStore;
    use crate::domain::detection::{FraudCategory, Urgency};
    use crate::domain::intelligence::IntelligenceCategory;
    use crate::domain::persona::PersonaId;
    use crate::domain::session::Sender;
    use crate::ports::GenerationFailure;

    struct Harness {
        orchestrator: ConversationOrchestrator,
        store: Arc<InMemorySessionStore>,
        evaluator: Arc<RecordingEvaluator>,
        clock: Arc<ManualClock>,
    }

    fn harness(generator: Arc<dyn TextGenerator>) -> Harness {
        harness_with(generator, OrchestratorSettings::default())
    }

    fn harness_with(generator: Arc<dyn TextGenerator>, settings: OrchestratorSettings) -> Harness {
        let clock = Arc::new(ManualClock::default());
        let store = Arc::new(InMemorySessionStore::new(clock.clone()));
        let evaluator = Arc::new(RecordingEvaluator::new());
        let metrics = Arc::new(EngineMetrics::new());
        let reporter = CompletionReporter::new(evaluator.clone(), metrics.clone());
        let orchestrator = ConversationOrchestrator::new(
            store.clone(),
            generator,
            clock.clone(),
            reporter,
            metrics,
            settings,
        )
        .with_assignor(PersonaAssignor::with_seed(7));

        Harness {
            orchestrator,
            store,
            evaluator,
            clock,
        }
    }

    fn id(s: &str) -> SessionId {
        SessionId::new(s).unwrap()
    }

    fn inbound(h: &Harness, session: &str, text: &str) -> InboundMessage {
        InboundMessage {
            session_id: id(session),
            message: Message::counterparty(text, h.clock.now()).unwrap(),
            conversation_history: Vec::new(),
            channel: Some("SMS".to_string()),
        }
    }

    fn fraud(category: FraudCategory, urgency: Urgency) -> Classification {
        Classification::new(true, 0.9, category, urgency)
    }

    mod detection {
        use super::*;

        #[tokio::test]
        async fn benign_message_gets_neutral_reply() {
            let mock = MockGenerator::new().with_classification(Classification::benign());
            let h = harness(Arc::new(mock.clone()));

            let outcome = h.orchestrator.handle_message(inbound(&h, "b-1", "hi, how are you?")).await;

            assert_eq!(outcome.reply, NEUTRAL_REPLY);
            assert!(!outcome.engaged);
            assert_eq!(mock.calls_for(GenerationTask::Reply), 0);
            let session = h.store.get(&id("b-1")).await.unwrap();
            assert_eq!(session.messages().len(), 2);
            assert!(session.intelligence().is_empty());
        }

        #[tokio::test]
        async fn activation_assigns_persona_and_generates_reply() {
            let mock = MockGenerator::new()
                .with_classification(fraud(FraudCategory::UpiFraud, Urgency::Low))
                .with_reply("Which UPI id should I use?");
            let h = harness(Arc::new(mock.clone()));

            let outcome = h
                .orchestrator
                .handle_message(inbound(&h, "u-1", "Pay 500 to refund@ybl to claim cashback"))
                .await;

            assert!(outcome.engaged);
            assert_eq!(outcome.reply, "Which UPI id should I use?");
            let session = h.store.get(&id("u-1")).await.unwrap();
            assert_eq!(session.fraud_category(), Some(&FraudCategory::UpiFraud));
            assert!(session.persona().is_some());
            assert!(session.intelligence().upi_ids.contains("refund@ybl"));
        }

        #[tokio::test]
        async fn pressing_urgency_picks_most_vulnerable_persona() {
            let mock = MockGenerator::new()
                .with_classification(fraud(FraudCategory::BankFraud, Urgency::Critical));
            let h = harness(Arc::new(mock));

            h.orchestrator
                .handle_message(inbound(&h, "p-1", "Your account is blocked, legal action today"))
                .await;

            let session = h.store.get(&id("p-1")).await.unwrap();
            assert_eq!(session.persona(), Some(PersonaId::ElderlyConfused));
        }

        #[tokio::test]
        async fn classification_is_not_repeated_once_engaged() {
            let mock = MockGenerator::new()
                .with_classification(fraud(FraudCategory::Phishing, Urgency::Medium));
            let h = harness(Arc::new(mock.clone()));

            for text in ["click http://bit.ly/kyc now", "hurry", "still there?"] {
                h.orchestrator.handle_message(inbound(&h, "c-1", text)).await;
            }

            assert_eq!(mock.calls_for(GenerationTask::Classify), 1);
            assert_eq!(mock.calls_for(GenerationTask::Reply), 3);
        }

        #[tokio::test]
        async fn keyword_fallback_engages_when_service_is_down() {
            let h = harness(Arc::new(UnconfiguredGenerator));

            let outcome = h
                .orchestrator
                .handle_message(inbound(
                    &h,
                    "k-1",
                    "Your account will be blocked. Verify immediately by sending OTP to 9876543210",
                ))
                .await;

            assert!(outcome.engaged);
            assert!(!outcome.reply.is_empty());
            let session = h.store.get(&id("k-1")).await.unwrap();
            assert!(session.intelligence().phone_numbers.contains("9876543210"));
        }
    }

    mod replies {
        use super::*;

        #[tokio::test]
        async fn failed_generation_uses_persona_fallback() {
            let mock = MockGenerator::new()
                .with_classification(fraud(FraudCategory::JobScam, Urgency::Low))
                .with_failure(GenerationTask::Reply, GenerationFailure::malformed("as an ai"))
                .with_default_reply("unused");
            let h = harness(Arc::new(mock));

            let outcome = h
                .orchestrator
                .handle_message(inbound(&h, "f-1", "Registration fee of 999 for the job"))
                .await;

            let session = h.store.get(&id("f-1")).await.unwrap();
            assert_eq!(
                outcome.reply,
                fallback_reply(session.persona(), session.message_count())
            );
            assert_eq!(h.orchestrator.metrics().snapshot(0).fallback_replies, 1);
        }

        #[tokio::test]
        async fn reply_request_carries_prior_history_only() {
            let mock = MockGenerator::new()
                .with_classification(fraud(FraudCategory::BankFraud, Urgency::Low));
            let h = harness(Arc::new(mock.clone()));

            for i in 0..4 {
                h.orchestrator
                    .handle_message(inbound(&h, "h-1", &format!("message {}", i)))
                    .await;
            }

            let last_reply = mock
                .calls()
                .into_iter()
                .filter(|r| r.task == GenerationTask::Reply)
                .last()
                .unwrap();
            assert_eq!(last_reply.counterparty_text, "message 3");
            assert_eq!(last_reply.recent_history.len(), 5);
            assert!(last_reply
                .recent_history
                .iter()
                .all(|m| m.text() != "message 3"));
            assert!(last_reply.persona.is_some());
            assert!(last_reply.stage_guidance.is_some());
        }

        #[tokio::test]
        async fn agent_messages_are_appended_but_not_mined() {
            let mock = MockGenerator::new()
                .with_classification(fraud(FraudCategory::BankFraud, Urgency::Low));
            let h = harness(Arc::new(mock));

            h.orchestrator.handle_message(inbound(&h, "a-1", "bank account problem")).await;
            let message = Message::new(Sender::Agent, "my number is 9123456789", h.clock.now()).unwrap();
            h.orchestrator
                .handle_message(InboundMessage {
                    session_id: id("a-1"),
                    message,
                    conversation_history: Vec::new(),
                    channel: None,
                })
                .await;

            let session = h.store.get(&id("a-1")).await.unwrap();
            assert_eq!(session.message_count(), 2);
            assert!(session.intelligence().get(IntelligenceCategory::PhoneNumbers).is_empty());
        }
    }

    mod completion {
        use super::*;

        #[tokio::test]
        async fn score_threshold_completes_and_reports_once() {
            let mock = MockGenerator::new()
                .with_classification(fraud(FraudCategory::BankFraud, Urgency::Low));
            let h = harness(Arc::new(mock));

            let outcome = h
                .orchestrator
                .handle_message(inbound(
                    &h,
                    "s-1",
                    "Send to account 123456789012 or pay@okaxis, or open http://bad.example/kyc",
                ))
                .await;

            assert_eq!(outcome.completion, Some(CompletionTrigger::IntelligenceScore));
            outcome.delivery.unwrap().await.unwrap();

            let again = h.orchestrator.handle_message(inbound(&h, "s-1", "hello?")).await;
            assert!(again.completion.is_none());
            assert_eq!(h.evaluator.delivered_count(), 1);

            let summary = &h.evaluator.delivered()[0];
            assert!(summary.fraud_detected);
            assert_eq!(summary.intelligence.bank_accounts, vec!["123456789012"]);
            assert!(summary.notes.starts_with("bank_fraud/"));
        }

        #[tokio::test]
        async fn observing_sessions_never_complete() {
            let mock = MockGenerator::new().with_classification(Classification::benign());
            let h = harness(Arc::new(mock));

            for _ in 0..20 {
                let outcome = h.orchestrator.handle_message(inbound(&h, "o-1", "hello")).await;
                assert!(outcome.completion.is_none());
            }
            assert_eq!(h.evaluator.attempts(), 0);
        }
    }

    mod deadline {
        use super::*;
        use std::time::Duration;

        fn tight() -> OrchestratorSettings {
            OrchestratorSettings {
                turn_deadline: Duration::from_secs(5),
                ..OrchestratorSettings::default()
            }
        }

        #[tokio::test(start_paused = true)]
        async fn slow_first_turn_replies_neutrally_and_still_saves() {
            let mock = MockGenerator::new()
                .with_classification(fraud(FraudCategory::BankFraud, Urgency::Low))
                .with_reply("Which bank is this?")
                .with_delay(Duration::from_secs(20));
            let h = harness_with(Arc::new(mock), tight());

            let outcome = h
                .orchestrator
                .handle_message(inbound(&h, "d-1", "Your bank account is blocked"))
                .await;
            assert_eq!(outcome.reply, NEUTRAL_REPLY);
            assert!(outcome.completion.is_none());

            tokio::time::sleep(Duration::from_secs(60)).await;

            let session = h.store.get(&id("d-1")).await.unwrap();
            assert!(session.is_engaged());
            assert_eq!(session.messages().len(), 2);
            assert_eq!(session.messages()[1].text(), "Which bank is this?");
        }

        #[tokio::test(start_paused = true)]
        async fn slow_turn_on_engaged_session_uses_persona_fallback() {
            let mock = MockGenerator::new()
                .with_classification(fraud(FraudCategory::BankFraud, Urgency::Low))
                .with_default_reply("Hello? Who is speaking?")
                .with_delay(Duration::from_secs(2));
            let h = harness_with(Arc::new(mock.clone()), tight());

            h.orchestrator
                .handle_message(inbound(&h, "d-2", "Your bank account is blocked"))
                .await;
            let engaged = h.store.get(&id("d-2")).await.unwrap();
            assert!(engaged.is_engaged());

            let slow = mock.with_delay(Duration::from_secs(30));
            let h2 = Harness {
                orchestrator: ConversationOrchestrator::new(
                    h.store.clone(),
                    Arc::new(slow),
                    h.clock.clone(),
                    CompletionReporter::new(h.evaluator.clone(), Arc::new(EngineMetrics::new())),
                    Arc::new(EngineMetrics::new()),
                    tight(),
                ),
                store: h.store.clone(),
                evaluator: h.evaluator.clone(),
                clock: h.clock.clone(),
            };

            let outcome = h2
                .orchestrator
                .handle_message(inbound(&h2, "d-2", "send the otp now"))
                .await;

            assert!(outcome.engaged);
            assert_eq!(
                outcome.reply,
                fallback_reply(engaged.persona(), engaged.message_count())
            );
            assert_eq!(h2.orchestrator.metrics().snapshot(0).fallback_replies, 1);
        }
    }
}
