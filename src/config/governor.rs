//! Quota governor configuration

use serde::Deserialize;
use std::time::Duration;

use crate::adapters::rate_limiter::QuotaConfig;

use super::error::ValidationError;

/// The four generation-service quotas and the wait ceiling
#[derive(Debug, Clone, Deserialize)]
pub struct GovernorConfig {
    /// Calls admitted per rolling minute
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u64,

    /// Calls admitted per rolling day
    #[serde(default = "default_requests_per_day")]
    pub requests_per_day: u64,

    /// Estimated tokens per rolling minute
    #[serde(default = "default_tokens_per_minute")]
    pub tokens_per_minute: u64,

    /// Estimated tokens per rolling day
    #[serde(default = "default_tokens_per_day")]
    pub tokens_per_day: u64,

    /// Longest wait before a call is abandoned for the fallback reply
    #[serde(default = "default_max_wait")]
    pub max_wait_secs: u64,
}

impl GovernorConfig {
    pub fn quota_config(&self) -> QuotaConfig {
        QuotaConfig {
            requests_per_minute: self.requests_per_minute,
            requests_per_day: self.requests_per_day,
            tokens_per_minute: self.tokens_per_minute,
            tokens_per_day: self.tokens_per_day,
            max_wait: Duration::from_secs(self.max_wait_secs),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let quotas = [
            ("requests_per_minute", self.requests_per_minute),
            ("requests_per_day", self.requests_per_day),
            ("tokens_per_minute", self.tokens_per_minute),
            ("tokens_per_day", self.tokens_per_day),
        ];
        match quotas.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(ValidationError::ZeroQuota(name)),
            None => Ok(()),
        }
    }
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
            requests_per_day: default_requests_per_day(),
            tokens_per_minute: default_tokens_per_minute(),
            tokens_per_day: default_tokens_per_day(),
            max_wait_secs: default_max_wait(),
        }
    }
}

fn default_requests_per_minute() -> u64 {
    30
}

fn default_requests_per_day() -> u64 {
    1_000
}

fn default_tokens_per_minute() -> u64 {
    12_000
}

fn default_tokens_per_day() -> u64 {
    100_000
}

fn default_max_wait() -> u64 {
    90
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_quota_config() {
        assert_eq!(GovernorConfig::default().quota_config(), QuotaConfig::default());
    }

    #[test]
    fn test_zero_quota_is_rejected() {
        let config = GovernorConfig {
            tokens_per_day: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::ZeroQuota("tokens_per_day")));
    }
}
