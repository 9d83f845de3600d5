//! Quota gate port for the external generation service.
//!
//! Four quotas guard the service at once: requests per minute and per day,
//! tokens per minute and per day. Implementations must serialize the
//! check-and-record sequence so concurrent callers cannot jointly overrun a
//! quota.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Port for admission control in front of the generation service.
#[async_trait]
pub trait QuotaGate: Send + Sync {
    /// Wait required before a call costing `estimated_tokens` would fit.
    ///
    /// Records nothing.
    async fn admit(&self, estimated_tokens: u32) -> Duration;

    /// Waits until the call fits, then records it at dispatch time.
    ///
    /// Fails without waiting when the required wait exceeds the ceiling.
    /// Returns the total time spent waiting.
    async fn acquire(&self, estimated_tokens: u32) -> Result<Duration, QuotaExceeded>;

    /// Current consumption across the four windows.
    async fn usage(&self) -> QuotaUsage;
}

/// The call would have to wait longer than the configured ceiling.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Quota exceeded: required wait {wait:?} exceeds ceiling {ceiling:?}")]
pub struct QuotaExceeded {
    /// Wait the call would have needed.
    pub wait: Duration,
    /// Configured maximum wait.
    pub ceiling: Duration,
}

/// Snapshot of consumption within each window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaUsage {
    pub requests_last_minute: u64,
    pub requests_last_day: u64,
    /// Estimated tokens, not the counts the service bills.
    pub tokens_last_minute: u64,
    pub tokens_last_day: u64,
    /// Calls admitted since the process started.
    pub requests_total: u64,
}
