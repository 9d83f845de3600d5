//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid {0} URL: must be http(s)")]
    InvalidUrl(&'static str),

    #[error("Quota {0} must be greater than zero")]
    ZeroQuota(&'static str),

    #[error(
        "Turn deadline ({turn_deadline_secs}s) must be shorter than the request timeout ({request_timeout_secs}s)"
    )]
    TurnDeadlineExceedsRequestTimeout {
        turn_deadline_secs: u64,
        request_timeout_secs: u64,
    },

    #[error("{field} must be within [{min}, {max}], got {actual}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        actual: f64,
    },
}
