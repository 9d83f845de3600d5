//! Session aggregate.

use crate::domain::detection::FraudCategory;
use crate::domain::foundation::{SessionId, Timestamp, ValidationError};
use crate::domain::intelligence::IntelligenceRecord;
use crate::domain::persona::PersonaId;

use super::message::Message;

/// One conversation with one counterparty.
///
/// Invariants held by the mutators below:
/// - `engaged` goes false → true at most once, and confidence/category are
///   written only at that moment
/// - `persona` is written at most once, and only on an engaged session
/// - `completed` goes false → true at most once, and only on an engaged session
/// - `messages` is append-only and `intelligence` only grows
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub(super) id: SessionId,
    pub(super) messages: Vec<Message>,
    pub(super) engaged: bool,
    pub(super) confidence: f64,
    pub(super) fraud_category: Option<FraudCategory>,
    pub(super) persona: Option<PersonaId>,
    pub(super) intelligence: IntelligenceRecord,
    pub(super) message_count: u32,
    pub(super) created_at: Timestamp,
    pub(super) last_activity_at: Timestamp,
    pub(super) completed: bool,
}

impl Session {
    /// Creates an empty, observing session.
    pub fn new(id: SessionId, now: Timestamp) -> Self {
        Self {
            id,
            messages: Vec::new(),
            engaged: false,
            confidence: 0.0,
            fraud_category: None,
            persona: None,
            intelligence: IntelligenceRecord::new(),
            message_count: 0,
            created_at: now,
            last_activity_at: now,
            completed: false,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn fraud_category(&self) -> Option<&FraudCategory> {
        self.fraud_category.as_ref()
    }

    pub fn persona(&self) -> Option<PersonaId> {
        self.persona
    }

    pub fn intelligence(&self) -> &IntelligenceRecord {
        &self.intelligence
    }

    pub fn message_count(&self) -> u32 {
        self.message_count
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn last_activity_at(&self) -> Timestamp {
        self.last_activity_at
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// The last `n` messages, oldest first.
    pub fn recent_history(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Current value score of the accumulated intelligence.
    pub fn intelligence_score(&self) -> f64 {
        self.intelligence.score()
    }

    // ───────────────────────────────────────────────────────────────
    // Mutators
    // ───────────────────────────────────────────────────────────────

    /// Appends an inbound message and counts the turn. A timestamp earlier
    /// than the last message is raised to keep the transcript ordered.
    pub fn receive(&mut self, message: Message) {
        let at = self.monotonic(message.timestamp());
        let message = message.not_before(at);
        self.touch(message.timestamp());
        self.messages.push(message);
        self.message_count = self.message_count.saturating_add(1);
    }

    /// Appends the engine's reply. Replies do not count as turns.
    pub fn record_reply(&mut self, text: impl Into<String>, at: Timestamp) -> Result<(), ValidationError> {
        let at = self.monotonic(at);
        let message = Message::agent(text, at)?;
        self.touch(at);
        self.messages.push(message);
        Ok(())
    }

    /// Engages the session. Returns false if it was already engaged.
    pub fn engage(&mut self, confidence: f64, category: FraudCategory) -> bool {
        if self.engaged {
            return false;
        }
        self.engaged = true;
        self.confidence = confidence.clamp(0.0, 1.0);
        self.fraud_category = Some(category);
        true
    }

    /// Assigns the persona. Returns false if one is already set or the
    /// session is not engaged.
    pub fn assign_persona(&mut self, persona: PersonaId) -> bool {
        if !self.engaged || self.persona.is_some() {
            return false;
        }
        self.persona = Some(persona);
        true
    }

    /// Merges extracted intelligence. Returns the number of new items.
    pub fn merge_intelligence(&mut self, partial: &IntelligenceRecord) -> usize {
        self.intelligence.merge(partial)
    }

    /// Marks the session completed. Returns true only for the call that
    /// performed the transition.
    pub fn mark_completed(&mut self) -> bool {
        if !self.engaged || self.completed {
            return false;
        }
        self.completed = true;
        true
    }

    /// Moves `last_activity_at` forward. Never moves it backwards.
    pub fn touch(&mut self, now: Timestamp) {
        if self.last_activity_at.is_before(&now) {
            self.last_activity_at = now;
        }
    }

    fn monotonic(&self, at: Timestamp) -> Timestamp {
        match self.messages.last() {
            Some(last) if at.is_before(&last.timestamp()) => last.timestamp(),
            _ => at,
        }
    }
}
