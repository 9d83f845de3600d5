//! Quota configuration for the generation service.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The four quotas and the wait ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Calls admitted in any rolling 60 seconds.
    pub requests_per_minute: u64,
    /// Calls admitted in any rolling 24 hours.
    pub requests_per_day: u64,
    /// Estimated tokens admitted in any rolling 60 seconds.
    pub tokens_per_minute: u64,
    /// Estimated tokens admitted in any rolling 24 hours.
    pub tokens_per_day: u64,
    /// Longest a caller may be made to wait before the call is abandoned.
    pub max_wait: Duration,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 30,
            requests_per_day: 1_000,
            tokens_per_minute: 12_000,
            tokens_per_day: 100_000,
            max_wait: Duration::from_secs(90),
        }
    }
}

impl QuotaConfig {
    /// Same limits with a different ceiling.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }
}
