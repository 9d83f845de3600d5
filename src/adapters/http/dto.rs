//! HTTP DTOs for the engine endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::application::MetricsSnapshot;
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, ValidationError};
use crate::domain::session::{Message, Sender};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/chat`. Keys are accepted in camelCase or snake_case.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(alias = "session_id")]
    pub session_id: String,
    pub message: MessageDto,
    #[serde(default, alias = "conversation_history")]
    pub conversation_history: Vec<MessageDto>,
    #[serde(default)]
    pub metadata: Option<ChatMetadata>,
}

/// One message as the caller sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageDto {
    pub sender: Sender,
    pub text: String,
    /// Unix milliseconds. Missing means "now".
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl MessageDto {
    pub fn into_message(self, now: Timestamp) -> Result<Message, ValidationError> {
        let timestamp = self.timestamp.map(Timestamp::from_unix_millis).unwrap_or(now);
        Message::new(self.sender, self.text, timestamp)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatMetadata {
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub status: String,
    pub reply: String,
}

impl ChatResponse {
    pub fn success(reply: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            reply: reply.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub active_sessions: usize,
    pub timestamp: Timestamp,
    pub generation_requests: u64,
}

/// Response for `GET /metrics`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub total_sessions: u64,
    pub frauds_detected: u64,
    pub average_messages_per_session: f64,
    pub total_intelligence_reported: u64,
    pub completed_sessions: u64,
    pub fallback_replies: u64,
    pub generation_requests: u64,
}

impl From<MetricsSnapshot> for MetricsResponse {
    fn from(snapshot: MetricsSnapshot) -> Self {
        Self {
            total_sessions: snapshot.total_sessions,
            frauds_detected: snapshot.frauds_detected,
            average_messages_per_session: snapshot.average_messages_per_session,
            total_intelligence_reported: snapshot.intelligence_items_reported,
            completed_sessions: snapshot.completed_sessions,
            fallback_replies: snapshot.fallback_replies,
            generation_requests: snapshot.generation_requests,
        }
    }
}

/// Standard error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        DomainError::new(ErrorCode::BadRequest, message).into()
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        DomainError::new(ErrorCode::Unauthorized, message).into()
    }
}

impl From<DomainError> for ErrorResponse {
    fn from(err: DomainError) -> Self {
        Self {
            code: err.code.to_string(),
            message: err.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_accepts_camel_case() {
        let json = r#"{
            "sessionId": "abc",
            "message": {"sender": "scammer", "text": "hello", "timestamp": 1700000000000},
            "conversationHistory": [],
            "metadata": {"channel": "SMS", "language": "English", "locale": "IN"}
        }"#;
        let req: ChatRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.session_id, "abc");
        assert_eq!(req.message.sender, Sender::Counterparty);
        assert_eq!(req.metadata.unwrap().channel.as_deref(), Some("SMS"));
    }

    #[test]
    fn chat_request_accepts_snake_case() {
        let json = r#"{
            "session_id": "abc",
            "message": {"sender": "scammer", "text": "hello"},
            "conversation_history": [{"sender": "user", "text": "hi", "timestamp": 1}]
        }"#;
        let req: ChatRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.conversation_history.len(), 1);
        assert_eq!(req.conversation_history[0].sender, Sender::Agent);
        assert!(req.metadata.is_none());
    }

    #[test]
    fn missing_timestamp_defaults_to_now() {
        let dto = MessageDto {
            sender: Sender::Counterparty,
            text: "hi".to_string(),
            timestamp: None,
        };
        let now = Timestamp::from_unix_millis(42);
        assert_eq!(dto.into_message(now).unwrap().timestamp(), now);
    }

    #[test]
    fn blank_text_is_rejected() {
        let dto = MessageDto {
            sender: Sender::Counterparty,
            text: "   ".to_string(),
            timestamp: Some(1),
        };
        assert!(dto.into_message(Timestamp::now()).is_err());
    }

    #[test]
    fn chat_response_shape() {
        let json = serde_json::to_value(ChatResponse::success("ok")).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "reply": "ok"}));
    }
}
