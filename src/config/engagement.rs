//! Engagement thresholds and session lifetime

use serde::Deserialize;
use std::time::Duration;

use crate::application::{OrchestratorSettings, SessionSweeperConfig};
use crate::domain::completion::CompletionPolicy;

use super::error::ValidationError;
use super::llm::LlmConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct EngagementConfig {
    /// Confidence a fraud verdict needs to engage a session
    #[serde(default = "default_detection_threshold")]
    pub detection_threshold: f64,

    /// Turn count that completes a session
    #[serde(default = "default_max_messages")]
    pub max_messages: u32,

    /// Intelligence score that completes a session
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f64,

    /// Prior messages handed to reply generation
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Idle time after which a session is evicted
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Seconds between eviction sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Longest a caller waits for a turn before getting a fallback reply.
    /// Must stay below `server.request_timeout_secs`.
    #[serde(default = "default_turn_deadline")]
    pub turn_deadline_secs: u64,
}

impl EngagementConfig {
    /// Pipeline settings, with generation budgets taken from `llm`.
    pub fn orchestrator_settings(&self, llm: &LlmConfig) -> OrchestratorSettings {
        OrchestratorSettings {
            detection_threshold: self.detection_threshold,
            completion: CompletionPolicy::new(self.max_messages, self.score_threshold),
            history_window: self.history_window,
            reply_max_tokens: llm.max_tokens_reply,
            reply_temperature: llm.temperature_reply,
            classify_max_tokens: llm.max_tokens_classify,
            classify_temperature: llm.temperature_classify,
            turn_deadline: Duration::from_secs(self.turn_deadline_secs),
        }
    }

    pub fn sweeper_config(&self) -> SessionSweeperConfig {
        SessionSweeperConfig::default()
            .with_interval(Duration::from_secs(self.sweep_interval_secs))
            .with_ttl(Duration::from_secs(self.session_ttl_secs))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.detection_threshold) {
            return Err(ValidationError::OutOfRange {
                field: "engagement.detection_threshold",
                min: 0.0,
                max: 1.0,
                actual: self.detection_threshold,
            });
        }
        if self.max_messages == 0 {
            return Err(ValidationError::MissingRequired("engagement.max_messages"));
        }
        if !self.score_threshold.is_finite() || self.score_threshold <= 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "engagement.score_threshold",
                min: f64::MIN_POSITIVE,
                max: f64::MAX,
                actual: self.score_threshold,
            });
        }
        if self.session_ttl_secs == 0
            || self.sweep_interval_secs == 0
            || self.turn_deadline_secs == 0
        {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            detection_threshold: default_detection_threshold(),
            max_messages: default_max_messages(),
            score_threshold: default_score_threshold(),
            history_window: default_history_window(),
            session_ttl_secs: default_session_ttl(),
            sweep_interval_secs: default_sweep_interval(),
            turn_deadline_secs: default_turn_deadline(),
        }
    }
}

fn default_detection_threshold() -> f64 {
    0.65
}

fn default_max_messages() -> u32 {
    15
}

fn default_score_threshold() -> f64 {
    8.0
}

fn default_history_window() -> usize {
    5
}

fn default_session_ttl() -> u64 {
    30 * 60
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_turn_deadline() -> u64 {
    25
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engagement_defaults() {
        let config = EngagementConfig::default();
        assert_eq!(config.detection_threshold, 0.65);
        assert_eq!(config.max_messages, 15);
        assert_eq!(config.score_threshold, 8.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_outside_unit_interval() {
        let config = EngagementConfig {
            detection_threshold: 1.2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_orchestrator_settings_take_llm_budgets() {
        let llm = LlmConfig {
            max_tokens_reply: 80,
            ..Default::default()
        };
        let settings = EngagementConfig::default().orchestrator_settings(&llm);
        assert_eq!(settings.reply_max_tokens, 80);
        assert_eq!(settings.history_window, 5);
        assert_eq!(settings.completion, CompletionPolicy::new(15, 8.0));
        assert_eq!(settings.turn_deadline, Duration::from_secs(25));
    }

    #[test]
    fn test_zero_turn_deadline_rejected() {
        let config = EngagementConfig {
            turn_deadline_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
    }

    #[test]
    fn test_sweeper_config() {
        let sweeper = EngagementConfig::default().sweeper_config();
        assert_eq!(sweeper.ttl, Duration::from_secs(1800));
        assert_eq!(sweeper.interval, Duration::from_secs(60));
    }
}
