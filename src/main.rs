//! Honeypot Engine server binary

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use tokio::net::TcpListener;
use tokio::sync::watch;

use honeypot_engine::adapters::callback::HttpEvaluatorClient;
use honeypot_engine::adapters::clock::SystemClock;
use honeypot_engine::adapters::http::{routes, with_middleware, ApiKeyState, EngineAppState};
use honeypot_engine::adapters::llm::{
    ChatCompletionsConfig, ChatCompletionsGenerator, GovernedGenerator, RetryPolicy,
    UnconfiguredGenerator,
};
use honeypot_engine::adapters::rate_limiter::SlidingWindowGovernor;
use honeypot_engine::adapters::storage::InMemorySessionStore;
use honeypot_engine::application::{
    CompletionReporter, ConversationOrchestrator, EngineMetrics, SessionSweeper,
};
use honeypot_engine::config::{AppConfig, LlmConfig};
use honeypot_engine::ports::{Clock, QuotaGate, SessionStore, TextGenerator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new(clock.clone()));
    let quota: Arc<dyn QuotaGate> = Arc::new(SlidingWindowGovernor::new(
        config.governor.quota_config(),
        clock.clone(),
    ));
    let generator = build_generator(&config.llm, quota.clone())?;

    let evaluator = Arc::new(HttpEvaluatorClient::new(config.callback.evaluator_config())?);
    let metrics = Arc::new(EngineMetrics::new());
    let reporter = CompletionReporter::new(evaluator, metrics.clone());

    let orchestrator = ConversationOrchestrator::new(
        store.clone(),
        generator,
        clock.clone(),
        reporter,
        metrics,
        config.engagement.orchestrator_settings(&config.llm),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = SessionSweeper::new(store, config.engagement.sweeper_config());
    let sweeper_task = tokio::spawn(async move { sweeper.run(shutdown_rx).await });

    let api_key = ApiKeyState::new(
        config
            .server
            .api_key
            .as_ref()
            .map(|key| key.expose_secret().clone()),
    );
    let app = with_middleware(
        routes(EngineAppState::new(orchestrator, quota, clock), api_key),
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        generation = config.llm.is_configured(),
        "honeypot-engine listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Signal received, shutting down");
        })
        .await?;

    let _ = shutdown_tx.send(true);
    let _ = sweeper_task.await;

    tracing::info!("honeypot-engine exiting cleanly");
    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` wins over
/// the configured level.
fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_generator(
    llm: &LlmConfig,
    quota: Arc<dyn QuotaGate>,
) -> Result<Arc<dyn TextGenerator>, Box<dyn Error + Send + Sync>> {
    let Some(api_key) = llm.api_key.as_ref().filter(|_| llm.is_configured()) else {
        tracing::warn!("No generation API key configured; replies will come from local fallbacks");
        return Ok(Arc::new(UnconfiguredGenerator));
    };

    let client = ChatCompletionsGenerator::new(
        ChatCompletionsConfig::new(api_key.expose_secret().clone())
            .with_model(llm.model.clone())
            .with_base_url(llm.base_url.clone())
            .with_timeout(llm.timeout()),
    )?;

    Ok(Arc::new(
        GovernedGenerator::new(Arc::new(client), quota, llm.timeout())
            .with_retry(RetryPolicy::new(llm.max_retries, llm.backoff())),
    ))
}
