//! Slow generation behind the production middleware stack: callers still get
//! a 200 with a reply before the request timeout, and the late turn is saved.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use honeypot_engine::adapters::callback::RecordingEvaluator;
use honeypot_engine::adapters::clock::ManualClock;
use honeypot_engine::adapters::http::{routes, with_middleware, ApiKeyState, EngineAppState};
use honeypot_engine::adapters::llm::{GovernedGenerator, MockGenerator, RetryPolicy};
use honeypot_engine::adapters::rate_limiter::SlidingWindowGovernor;
use honeypot_engine::adapters::storage::InMemorySessionStore;
use honeypot_engine::application::{CompletionReporter, ConversationOrchestrator, EngineMetrics};
use honeypot_engine::config::AppConfig;
use honeypot_engine::domain::conversation::NEUTRAL_REPLY;
use honeypot_engine::domain::detection::{Classification, FraudCategory, Urgency};
use honeypot_engine::domain::foundation::SessionId;
use honeypot_engine::ports::SessionStore;

const API_KEY: &str = "test-key";
const CALL_LATENCY: Duration = Duration::from_secs(20);

/// The engine wired from default configuration, with every model call
/// taking `CALL_LATENCY`.
fn slow_engine() -> (Router, Arc<InMemorySessionStore>) {
    let config = AppConfig::default();
    assert!(config.validate().is_ok());

    let clock = Arc::new(ManualClock::default());
    let store = Arc::new(InMemorySessionStore::new(clock.clone()));
    let metrics = Arc::new(EngineMetrics::new());
    let quota = Arc::new(SlidingWindowGovernor::new(config.governor.quota_config(), clock.clone()));

    let mock = MockGenerator::new()
        .with_classification(Classification::new(true, 0.9, FraudCategory::BankFraud, Urgency::Low))
        .with_delay(CALL_LATENCY);
    let generator = GovernedGenerator::new(Arc::new(mock), quota.clone(), config.llm.timeout())
        .with_retry(RetryPolicy::new(config.llm.max_retries, config.llm.backoff()));

    let orchestrator = ConversationOrchestrator::new(
        store.clone(),
        Arc::new(generator),
        clock.clone(),
        CompletionReporter::new(Arc::new(RecordingEvaluator::new()), metrics.clone()),
        metrics,
        config.engagement.orchestrator_settings(&config.llm),
    );

    let app = with_middleware(
        routes(
            EngineAppState::new(orchestrator, quota, clock),
            ApiKeyState::new(Some(API_KEY.to_string())),
        ),
        Duration::from_secs(config.server.request_timeout_secs),
    );
    (app, store)
}

fn chat(session: &str, text: &str) -> Request<Body> {
    let body = json!({
        "sessionId": session,
        "message": {"sender": "scammer", "text": text, "timestamp": 1_700_000_000_000i64},
        "conversationHistory": [],
        "metadata": {"channel": "SMS", "language": "English", "locale": "IN"}
    });
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test(start_paused = true)]
async fn slow_turn_answers_before_request_timeout() {
    let (app, store) = slow_engine();

    let response = app
        .clone()
        .oneshot(chat("slow-1", "Your bank account is blocked, verify now"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["reply"], NEUTRAL_REPLY);

    // Classification plus reply take two call latencies; let them land.
    tokio::time::sleep(CALL_LATENCY * 3).await;

    let session = store.get(&SessionId::new("slow-1").unwrap()).await.unwrap();
    assert!(session.is_engaged());
    assert_eq!(session.messages().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn duplicate_queued_behind_slow_turn_is_not_timed_out() {
    let (app, store) = slow_engine();

    let (first, second) = tokio::join!(
        app.clone().oneshot(chat("slow-2", "Your bank account is blocked, verify now")),
        app.clone().oneshot(chat("slow-2", "Your bank account is blocked, verify now")),
    );

    for response in [first.unwrap(), second.unwrap()] {
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(!body["reply"].as_str().unwrap().is_empty());
    }

    tokio::time::sleep(CALL_LATENCY * 6).await;

    let session = store.get(&SessionId::new("slow-2").unwrap()).await.unwrap();
    assert!(session.is_engaged());
    assert_eq!(session.messages().len(), 4);
}
