//! SessionSweeper - background expiry of idle sessions.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `interval` | 60s | Time between sweeps |
//! | `ttl` | 30min | Inactivity after which a session is dropped |
//!
//! Sessions with a turn in flight are never swept.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::ports::SessionStore;

#[derive(Debug, Clone)]
pub struct SessionSweeperConfig {
    pub interval: Duration,
    pub ttl: Duration,
}

impl Default for SessionSweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            ttl: Duration::from_secs(30 * 60),
        }
    }
}

impl SessionSweeperConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

pub struct SessionSweeper {
    store: Arc<dyn SessionStore>,
    config: SessionSweeperConfig,
}

impl SessionSweeper {
    pub fn new(store: Arc<dyn SessionStore>, config: SessionSweeperConfig) -> Self {
        Self { store, config }
    }

    /// Runs until the shutdown signal flips to `true`.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.interval);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Session sweeper stopped");
                        return;
                    }
                }

                _ = interval.tick() => {
                    self.sweep_once().await;
                }
            }
        }
    }

    /// One sweep. Returns the number of sessions removed.
    pub async fn sweep_once(&self) -> usize {
        let removed = self.store.sweep_expired(self.config.ttl).await;
        if removed > 0 {
            tracing::info!(removed, "Expired idle sessions");
        } else {
            tracing::debug!("Session sweep found nothing to expire");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use crate::adapters::storage::InMemorySessionStore;
    use crate::domain::foundation::SessionId;

    fn id(s: &str) -> SessionId {
        SessionId::new(s).unwrap()
    }

    #[tokio::test]
    async fn sweep_once_removes_only_expired_sessions() {
        let clock = Arc::new(ManualClock::default());
        let store = Arc::new(InMemorySessionStore::new(clock.clone()));
        store.get_or_create(&id("old")).await;
        clock.advance(Duration::from_secs(20 * 60));
        store.get_or_create(&id("fresh")).await;
        clock.advance(Duration::from_secs(15 * 60));

        let sweeper = SessionSweeper::new(store.clone(), SessionSweeperConfig::default());

        assert_eq!(sweeper.sweep_once().await, 1);
        assert!(store.get(&id("old")).await.is_none());
        assert!(store.get(&id("fresh")).await.is_some());
    }

    #[tokio::test]
    async fn run_stops_on_shutdown_signal() {
        let clock = Arc::new(ManualClock::default());
        let store = Arc::new(InMemorySessionStore::new(clock));
        let sweeper = SessionSweeper::new(
            store,
            SessionSweeperConfig::default().with_interval(Duration::from_millis(10)),
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(async move { sweeper.run(shutdown_rx).await });

        tokio::time::sleep(Duration::from_millis(30)).await;
        shutdown_tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper should stop")
            .unwrap();
    }
}
