//! In-memory sliding-window governor.
//!
//! Four windows, each a time-ordered queue of `(timestamp, cost)` entries,
//! share one mutex so the check and the record happen atomically.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::ports::{Clock, QuotaExceeded, QuotaGate, QuotaUsage};

use super::config::QuotaConfig;

const MINUTE_MILLIS: i64 = 60 * 1000;
const DAY_MILLIS: i64 = 24 * 60 * MINUTE_MILLIS;

/// One rolling window with a ceiling on the summed cost of its entries.
#[derive(Debug)]
struct Window {
    span_millis: i64,
    limit: u64,
    entries: VecDeque<(i64, u64)>,
    total: u64,
}

impl Window {
    fn new(span_millis: i64, limit: u64) -> Self {
        Self {
            span_millis,
            limit,
            entries: VecDeque::new(),
            total: 0,
        }
    }

    /// Drops entries whose age has reached the span.
    fn prune(&mut self, now: i64) {
        while let Some(&(at, cost)) = self.entries.front() {
            if now - at < self.span_millis {
                break;
            }
            self.entries.pop_front();
            self.total -= cost;
        }
    }

    /// Milliseconds until `cost` more would fit, or `None` if it never can.
    fn wait_millis(&self, now: i64, cost: u64) -> Option<i64> {
        if cost > self.limit {
            return None;
        }
        if self.total + cost <= self.limit {
            return Some(0);
        }

        let excess = self.total + cost - self.limit;
        let mut freed = 0;
        for &(at, entry_cost) in &self.entries {
            freed += entry_cost;
            if freed >= excess {
                return Some((at + self.span_millis - now).max(0));
            }
        }
        // Unreachable while total equals the sum of entries.
        Some(self.span_millis)
    }

    fn record(&mut self, now: i64, cost: u64) {
        self.entries.push_back((now, cost));
        self.total += cost;
    }
}

#[derive(Debug)]
struct GovernorState {
    requests_per_minute: Window,
    requests_per_day: Window,
    tokens_per_minute: Window,
    tokens_per_day: Window,
    admitted_total: u64,
}

impl GovernorState {
    fn new(config: &QuotaConfig) -> Self {
        Self {
            requests_per_minute: Window::new(MINUTE_MILLIS, config.requests_per_minute),
            requests_per_day: Window::new(DAY_MILLIS, config.requests_per_day),
            tokens_per_minute: Window::new(MINUTE_MILLIS, config.tokens_per_minute),
            tokens_per_day: Window::new(DAY_MILLIS, config.tokens_per_day),
            admitted_total: 0,
        }
    }

    fn prune(&mut self, now: i64) {
        self.requests_per_minute.prune(now);
        self.requests_per_day.prune(now);
        self.tokens_per_minute.prune(now);
        self.tokens_per_day.prune(now);
    }

    /// Longest of the four waits. `Duration::MAX` if any quota can never fit.
    fn wait(&self, now: i64, tokens: u64) -> Duration {
        let waits = [
            self.requests_per_minute.wait_millis(now, 1),
            self.requests_per_day.wait_millis(now, 1),
            self.tokens_per_minute.wait_millis(now, tokens),
            self.tokens_per_day.wait_millis(now, tokens),
        ];

        let mut longest = 0;
        for wait in waits {
            match wait {
                Some(millis) => longest = longest.max(millis),
                None => return Duration::MAX,
            }
        }
        Duration::from_millis(longest as u64)
    }

    fn record(&mut self, now: i64, tokens: u64) {
        self.requests_per_minute.record(now, 1);
        self.requests_per_day.record(now, 1);
        self.tokens_per_minute.record(now, tokens);
        self.tokens_per_day.record(now, tokens);
        self.admitted_total += 1;
    }
}

/// Process-wide governor for calls to the generation service.
///
/// Construct one at startup and share it; there is no global instance.
pub struct SlidingWindowGovernor {
    config: QuotaConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<GovernorState>,
}

impl SlidingWindowGovernor {
    pub fn new(config: QuotaConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(GovernorState::new(&config)),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &QuotaConfig {
        &self.config
    }

    fn now_millis(&self) -> i64 {
        self.clock.now().as_unix_millis()
    }

    /// Admits and records in one step if no wait is needed.
    pub async fn try_acquire(&self, estimated_tokens: u32) -> bool {
        let tokens = u64::from(estimated_tokens);
        let mut state = self.state.lock().await;
        let now = self.now_millis();
        state.prune(now);
        if state.wait(now, tokens).is_zero() {
            state.record(now, tokens);
            true
        } else {
            false
        }
    }
}

impl std::fmt::Debug for SlidingWindowGovernor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlidingWindowGovernor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl QuotaGate for SlidingWindowGovernor {
    async fn admit(&self, estimated_tokens: u32) -> Duration {
        let mut state = self.state.lock().await;
        let now = self.now_millis();
        state.prune(now);
        state.wait(now, u64::from(estimated_tokens))
    }

    async fn acquire(&self, estimated_tokens: u32) -> Result<Duration, QuotaExceeded> {
        let tokens = u64::from(estimated_tokens);
        let mut waited = Duration::ZERO;

        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = self.now_millis();
                state.prune(now);
                let wait = state.wait(now, tokens);
                if wait.is_zero() {
                    state.record(now, tokens);
                    return Ok(waited);
                }
                wait
            };

            if waited.saturating_add(wait) > self.config.max_wait {
                tracing::warn!(
                    wait_ms = wait.as_millis() as u64,
                    waited_ms = waited.as_millis() as u64,
                    estimated_tokens,
                    "Quota wait exceeds ceiling, abandoning call"
                );
                return Err(QuotaExceeded {
                    wait,
                    ceiling: self.config.max_wait,
                });
            }

            tracing::debug!(wait_ms = wait.as_millis() as u64, estimated_tokens, "Waiting for quota");
            self.clock.sleep(wait).await;
            waited += wait;
        }
    }

    async fn usage(&self) -> QuotaUsage {
        let mut state = self.state.lock().await;
        state.prune(self.now_millis());
        QuotaUsage {
            requests_last_minute: state.requests_per_minute.total,
            requests_last_day: state.requests_per_day.total,
            tokens_last_minute: state.tokens_per_minute.total,
            tokens_last_day: state.tokens_per_day.total,
            requests_total: state.admitted_total,
        }
    }
}
