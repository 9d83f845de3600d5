//! Route definitions for the engine endpoints

use std::time::Duration;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{chat, health, metrics, root, EngineAppState};
use super::middleware::{require_api_key, ApiKeyState};

/// Create the engine router
///
/// # Endpoints
///
/// - `POST /api/chat` - Handle an inbound message (API key required)
/// - `GET /health` - Service health
/// - `GET /metrics` - Engine counters
/// - `GET /` - Service descriptor
pub fn routes(state: EngineAppState, api_key: ApiKeyState) -> Router {
    let protected = Router::new()
        .route("/api/chat", post(chat))
        .layer(from_fn_with_state(api_key, require_api_key));

    Router::new()
        .merge(protected)
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/", get(root))
        .with_state(state)
}

/// Wraps the router in the transport stack: tracing, permissive CORS and a
/// whole-request timeout that answers 408 once `request_timeout` elapses.
pub fn with_middleware(router: Router, request_timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(TimeoutLayer::new(request_timeout)),
    )
}
