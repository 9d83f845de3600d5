//! Engine counters.
//!
//! Plain atomics; the HTTP layer reads them through [`EngineMetrics::snapshot`].

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counters, shared behind an `Arc`.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    sessions_created: AtomicU64,
    frauds_detected: AtomicU64,
    inbound_messages: AtomicU64,
    completed_sessions: AtomicU64,
    intelligence_items_reported: AtomicU64,
    fallback_replies: AtomicU64,
}

/// Point-in-time view of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub total_sessions: u64,
    pub frauds_detected: u64,
    pub total_messages: u64,
    pub average_messages_per_session: f64,
    pub completed_sessions: u64,
    pub intelligence_items_reported: u64,
    pub fallback_replies: u64,
    pub generation_requests: u64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_session_created(&self) {
        self.sessions_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fraud_detected(&self) {
        self.frauds_detected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_inbound_message(&self) {
        self.inbound_messages.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback_reply(&self) {
        self.fallback_replies.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a completed session and the items its summary carried.
    pub fn record_completion(&self, items_reported: usize) {
        self.completed_sessions.fetch_add(1, Ordering::Relaxed);
        self.intelligence_items_reported
            .fetch_add(items_reported as u64, Ordering::Relaxed);
    }

    /// `generation_requests` comes from the quota gate, which sees every
    /// dispatched call including retries.
    pub fn snapshot(&self, generation_requests: u64) -> MetricsSnapshot {
        let total_sessions = self.sessions_created.load(Ordering::Relaxed);
        let total_messages = self.inbound_messages.load(Ordering::Relaxed);
        let average = if total_sessions == 0 {
            0.0
        } else {
            ((total_messages as f64 / total_sessions as f64) * 100.0).round() / 100.0
        };

        MetricsSnapshot {
            total_sessions,
            frauds_detected: self.frauds_detected.load(Ordering::Relaxed),
            total_messages,
            average_messages_per_session: average,
            completed_sessions: self.completed_sessions.load(Ordering::Relaxed),
            intelligence_items_reported: self.intelligence_items_reported.load(Ordering::Relaxed),
            fallback_replies: self.fallback_replies.load(Ordering::Relaxed),
            generation_requests,
        }
    }
}
