//! Transcript messages.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Timestamp, ValidationError};

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The external sender being engaged.
    #[serde(alias = "scammer")]
    Counterparty,
    /// The engine, speaking as the assigned persona.
    #[serde(alias = "user")]
    Agent,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::Counterparty => write!(f, "counterparty"),
            Sender::Agent => write!(f, "agent"),
        }
    }
}

/// One immutable transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    sender: Sender,
    text: String,
    timestamp: Timestamp,
}

impl Message {
    /// Creates a message, rejecting blank text.
    pub fn new(
        sender: Sender,
        text: impl Into<String>,
        timestamp: Timestamp,
    ) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::empty_field("text"));
        }
        Ok(Self {
            sender,
            text,
            timestamp,
        })
    }

    pub fn counterparty(text: impl Into<String>, timestamp: Timestamp) -> Result<Self, ValidationError> {
        Self::new(Sender::Counterparty, text, timestamp)
    }

    pub fn agent(text: impl Into<String>, timestamp: Timestamp) -> Result<Self, ValidationError> {
        Self::new(Sender::Agent, text, timestamp)
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn is_from_counterparty(&self) -> bool {
        self.sender == Sender::Counterparty
    }

    /// Moves the timestamp up to `floor` if it is earlier.
    pub(crate) fn not_before(mut self, floor: Timestamp) -> Self {
        if self.timestamp.is_before(&floor) {
            self.timestamp = floor;
        }
        self
    }
}
