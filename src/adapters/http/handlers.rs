//! HTTP handlers for the engine endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{ConversationOrchestrator, InboundMessage};
use crate::domain::foundation::{DomainError, SessionId};
use crate::ports::{Clock, QuotaGate};

use super::dto::{ChatRequest, ChatResponse, ErrorResponse, HealthResponse, MetricsResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the engine endpoints.
#[derive(Clone)]
pub struct EngineAppState {
    pub orchestrator: ConversationOrchestrator,
    pub quota: Arc<dyn QuotaGate>,
    pub clock: Arc<dyn Clock>,
}

impl EngineAppState {
    pub fn new(
        orchestrator: ConversationOrchestrator,
        quota: Arc<dyn QuotaGate>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orchestrator,
            quota,
            clock,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// Handle one inbound message
///
/// POST /api/chat
///
/// Every well-formed request gets `{status: "success", reply}`, whatever
/// happened upstream.
pub async fn chat(
    State(state): State<EngineAppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_request(ErrorResponse::bad_request(rejection.body_text())),
    };

    let session_id = match SessionId::new(req.session_id) {
        Ok(id) => id,
        Err(e) => return bad_request(DomainError::from(e).into()),
    };

    let now = state.clock.now();
    let message = match req.message.into_message(now) {
        Ok(message) => message,
        Err(e) => return bad_request(DomainError::from(e).into()),
    };

    // History entries are context only; unusable ones are dropped.
    let conversation_history = req
        .conversation_history
        .into_iter()
        .filter_map(|m| m.into_message(now).ok())
        .collect();

    let inbound = InboundMessage {
        session_id,
        message,
        conversation_history,
        channel: req.metadata.and_then(|m| m.channel),
    };

    let outcome = state.orchestrator.handle_message(inbound).await;
    (StatusCode::OK, Json(ChatResponse::success(outcome.reply))).into_response()
}

/// Service health
///
/// GET /health
pub async fn health(State(state): State<EngineAppState>) -> Json<HealthResponse> {
    let usage = state.quota.usage().await;
    Json(HealthResponse {
        status: "healthy".to_string(),
        active_sessions: state.orchestrator.store().active_count().await,
        timestamp: state.clock.now(),
        generation_requests: usage.requests_total,
    })
}

/// Engine counters
///
/// GET /metrics
pub async fn metrics(State(state): State<EngineAppState>) -> Json<MetricsResponse> {
    let usage = state.quota.usage().await;
    Json(state.orchestrator.metrics().snapshot(usage.requests_total).into())
}

/// Service descriptor
///
/// GET /
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "honeypot-engine",
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "endpoints": {
            "chat": "POST /api/chat",
            "health": "GET /health",
            "metrics": "GET /metrics"
        }
    }))
}

fn bad_request(body: ErrorResponse) -> Response {
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}
