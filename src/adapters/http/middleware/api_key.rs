//! `x-api-key` check for the chat endpoint.
//!
//! ```text
//! Request → require_api_key → handler
//!              ↓ (missing or wrong key)
//!           401 {code: "UNAUTHORIZED"}
//! ```
//!
//! With no key configured the check is disabled.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, Secret};

use crate::adapters::http::dto::ErrorResponse;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Expected key, shared by every request.
#[derive(Clone)]
pub struct ApiKeyState {
    expected: Option<Arc<Secret<String>>>,
}

impl ApiKeyState {
    pub fn new(expected: Option<String>) -> Self {
        if expected.is_none() {
            tracing::warn!("No API key configured; the chat endpoint accepts all requests");
        }
        Self {
            expected: expected.map(|key| Arc::new(Secret::new(key))),
        }
    }

    fn accepts(&self, presented: Option<&str>) -> bool {
        match &self.expected {
            None => true,
            Some(expected) => presented == Some(expected.expose_secret().as_str()),
        }
    }
}

pub async fn require_api_key(
    State(state): State<ApiKeyState>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    if state.accepts(presented) {
        next.run(request).await
    } else {
        tracing::warn!("Rejected request with invalid API key");
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::unauthorized("Invalid API key")),
        )
            .into_response()
    }
}
