//! CompletionPolicy - decides when an engaged session stops and reports.

use serde::{Deserialize, Serialize};

use crate::domain::session::Session;

pub const DEFAULT_MAX_MESSAGES: u32 = 15;
pub const DEFAULT_SCORE_THRESHOLD: f64 = 8.0;

/// Which condition ended the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionTrigger {
    MessageCount,
    IntelligenceScore,
}

/// Completion thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionPolicy {
    pub max_messages: u32,
    pub score_threshold: f64,
}

impl CompletionPolicy {
    pub fn new(max_messages: u32, score_threshold: f64) -> Self {
        Self {
            max_messages,
            score_threshold,
        }
    }

    /// Returns the trigger that fires for this session, if any.
    ///
    /// Only engaged, not-yet-completed sessions can fire. When both
    /// conditions hold the message count is reported.
    pub fn evaluate(&self, session: &Session) -> Option<CompletionTrigger> {
        if !session.is_engaged() || session.is_completed() {
            return None;
        }
        if session.message_count() >= self.max_messages {
            return Some(CompletionTrigger::MessageCount);
        }
        if session.intelligence_score() >= self.score_threshold {
            return Some(CompletionTrigger::IntelligenceScore);
        }
        None
    }
}

impl Default for CompletionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGES, DEFAULT_SCORE_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::detection::FraudCategory;
    use crate::domain::foundation::{SessionId, Timestamp};
    use crate::domain::intelligence::{IntelligenceCategory, IntelligenceRecord};
    use crate::domain::session::Message;

    fn engaged_with_turns(turns: u32) -> Session {
        let mut session = Session::new(SessionId::new("c-1").unwrap(), Timestamp::now());
        session.engage(0.9, FraudCategory::BankFraud);
        for _ in 0..turns {
            session.receive(Message::counterparty("pay now", Timestamp::now()).unwrap());
        }
        session
    }

    #[test]
    fn fires_on_message_count() {
        let policy = CompletionPolicy::default();
        assert_eq!(policy.evaluate(&engaged_with_turns(14)), None);
        assert_eq!(
            policy.evaluate(&engaged_with_turns(15)),
            Some(CompletionTrigger::MessageCount)
        );
    }

    #[test]
    fn fires_on_score() {
        let mut session = engaged_with_turns(2);
        session.merge_intelligence(
            &IntelligenceRecord::new()
                .with(IntelligenceCategory::BankAccounts, "123456789012")
                .with(IntelligenceCategory::UpiIds, "x@ybl")
                .with(IntelligenceCategory::PhishingLinks, "http://evil.example"),
        );
        assert_eq!(
            CompletionPolicy::default().evaluate(&session),
            Some(CompletionTrigger::IntelligenceScore)
        );
    }

    #[test]
    fn observing_sessions_never_fire() {
        let mut session = Session::new(SessionId::new("c-2").unwrap(), Timestamp::now());
        for _ in 0..20 {
            session.receive(Message::counterparty("hi", Timestamp::now()).unwrap());
        }
        assert_eq!(CompletionPolicy::default().evaluate(&session), None);
    }

    #[test]
    fn completed_sessions_never_fire_again() {
        let mut session = engaged_with_turns(15);
        session.mark_completed();
        assert_eq!(CompletionPolicy::default().evaluate(&session), None);
    }
}
