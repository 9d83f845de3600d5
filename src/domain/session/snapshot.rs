//! SessionSnapshot - the serialized session record.
//!
//! Snapshots cross a trust boundary (import, debugging, future persistence),
//! so converting one back into a `Session` validates every invariant and
//! rejects the snapshot rather than repairing it.

use serde::{Deserialize, Serialize};

use crate::domain::detection::FraudCategory;
use crate::domain::foundation::{SessionId, Timestamp, ValidationError};
use crate::domain::intelligence::{IntelligenceCategory, IntelligenceRecord};
use crate::domain::persona::PersonaId;

use super::aggregate::Session;
use super::message::{Message, Sender};

/// Plain serialized form of a `Session`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub engaged: bool,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub fraud_category: Option<FraudCategory>,
    #[serde(default)]
    pub persona: Option<PersonaId>,
    #[serde(default)]
    pub intelligence: IntelligenceRecord,
    pub message_count: u32,
    pub created_at: Timestamp,
    pub last_activity_at: Timestamp,
    #[serde(default)]
    pub completed: bool,
}

impl From<&Session> for SessionSnapshot {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.to_string(),
            messages: session.messages.clone(),
            engaged: session.engaged,
            confidence: session.confidence,
            fraud_category: session.fraud_category.clone(),
            persona: session.persona,
            intelligence: session.intelligence.clone(),
            message_count: session.message_count,
            created_at: session.created_at,
            last_activity_at: session.last_activity_at,
            completed: session.completed,
        }
    }
}

impl TryFrom<SessionSnapshot> for Session {
    type Error = ValidationError;

    fn try_from(snapshot: SessionSnapshot) -> Result<Self, Self::Error> {
        let id = SessionId::new(snapshot.id)?;

        if !snapshot.confidence.is_finite() || !(0.0..=1.0).contains(&snapshot.confidence) {
            return Err(ValidationError::out_of_range(
                "confidence",
                0.0,
                1.0,
                snapshot.confidence,
            ));
        }

        if !snapshot.engaged {
            if snapshot.fraud_category.is_some() {
                return Err(ValidationError::invalid_format(
                    "fraudCategory",
                    "set on a session that is not engaged",
                ));
            }
            if snapshot.persona.is_some() {
                return Err(ValidationError::invalid_format(
                    "persona",
                    "set on a session that is not engaged",
                ));
            }
            if snapshot.completed {
                return Err(ValidationError::invalid_format(
                    "completed",
                    "set on a session that is not engaged",
                ));
            }
        }

        let counterparty_turns = snapshot
            .messages
            .iter()
            .filter(|m| m.sender() == Sender::Counterparty)
            .count();
        if (snapshot.message_count as usize) < counterparty_turns {
            return Err(ValidationError::invalid_format(
                "messageCount",
                format!(
                    "{} is less than the {} counterparty messages present",
                    snapshot.message_count, counterparty_turns
                ),
            ));
        }

        if snapshot.messages.iter().any(|m| m.text().trim().is_empty()) {
            return Err(ValidationError::empty_field("messages.text"));
        }

        let ordered = snapshot
            .messages
            .windows(2)
            .all(|pair| !pair[1].timestamp().is_before(&pair[0].timestamp()));
        if !ordered {
            return Err(ValidationError::invalid_format(
                "messages",
                "timestamps are not in order",
            ));
        }

        if snapshot.last_activity_at.is_before(&snapshot.created_at) {
            return Err(ValidationError::invalid_format(
                "lastActivityAt",
                "precedes createdAt",
            ));
        }

        let mut normalized = IntelligenceRecord::new();
        for category in IntelligenceCategory::ALL {
            for value in snapshot.intelligence.get(category) {
                if category.normalize(value).as_deref() != Some(value.as_str()) {
                    return Err(ValidationError::invalid_format(
                        "intelligence",
                        format!("'{}' is not a normalized {:?} value", value, category),
                    ));
                }
                normalized.insert(category, value);
            }
        }

        Ok(Session {
            id,
            messages: snapshot.messages,
            engaged: snapshot.engaged,
            confidence: snapshot.confidence,
            fraud_category: snapshot.fraud_category,
            persona: snapshot.persona,
            intelligence: normalized,
            message_count: snapshot.message_count,
            created_at: snapshot.created_at,
            last_activity_at: snapshot.last_activity_at,
            completed: snapshot.completed,
        })
    }
}
