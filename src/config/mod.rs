//! Application configuration module
//!
//! Configuration is read from environment variables with the `HONEYPOT`
//! prefix, using `__` to separate nested values. Every section has working
//! defaults, so an empty environment yields a runnable engine that answers
//! from local fallbacks until a generation API key is supplied.
//!
//! # Example
//!
//! ```no_run
//! use honeypot_engine::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Listening on {}", config.server.socket_addr().unwrap());
//! ```

mod callback;
mod engagement;
mod error;
mod governor;
mod llm;
mod server;

pub use callback::CallbackConfig;
pub use engagement::EngagementConfig;
pub use error::{ConfigError, ValidationError};
pub use governor::GovernorConfig;
pub use llm::LlmConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Bind address, environment, inbound API key
    #[serde(default)]
    pub server: ServerConfig,

    /// Generation service endpoint and call budgets
    #[serde(default)]
    pub llm: LlmConfig,

    /// Generation quotas
    #[serde(default)]
    pub governor: GovernorConfig,

    #[serde(default)]
    pub engagement: EngagementConfig,

    /// Evaluator callback
    #[serde(default)]
    pub callback: CallbackConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Environment Variable Format
    ///
    /// - `HONEYPOT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `HONEYPOT__LLM__API_KEY=...` -> `llm.api_key = ...`
    /// - `HONEYPOT__ENGAGEMENT__MAX_MESSAGES=20` -> `engagement.max_messages = 20`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("HONEYPOT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.llm.validate()?;
        self.governor.validate()?;
        self.engagement.validate()?;
        self.callback.validate()?;

        // The turn deadline must fire before the transport gives up.
        if self.engagement.turn_deadline_secs >= self.server.request_timeout_secs {
            return Err(ValidationError::TurnDeadlineExceedsRequestTimeout {
                turn_deadline_secs: self.engagement.turn_deadline_secs,
                request_timeout_secs: self.server.request_timeout_secs,
            });
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "HONEYPOT__SERVER__PORT",
        "HONEYPOT__SERVER__ENVIRONMENT",
        "HONEYPOT__SERVER__API_KEY",
        "HONEYPOT__LLM__API_KEY",
        "HONEYPOT__ENGAGEMENT__MAX_MESSAGES",
        "HONEYPOT__GOVERNOR__REQUESTS_PER_MINUTE",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.engagement.max_messages, 15);
        assert!(!config.llm.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("HONEYPOT__SERVER__PORT", "3000");
        env::set_var("HONEYPOT__ENGAGEMENT__MAX_MESSAGES", "20");
        env::set_var("HONEYPOT__GOVERNOR__REQUESTS_PER_MINUTE", "10");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.engagement.max_messages, 20);
        assert_eq!(config.governor.requests_per_minute, 10);
    }

    #[test]
    fn test_secrets_are_loaded() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("HONEYPOT__SERVER__API_KEY", "inbound-key");
        env::set_var("HONEYPOT__LLM__API_KEY", "gsk_test");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.llm.is_configured());
        assert_eq!(
            config.server.api_key.as_ref().map(|k| k.expose_secret().as_str()),
            Some("inbound-key")
        );
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("HONEYPOT__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }

    #[test]
    fn test_validate_reports_first_bad_section() {
        let mut config = AppConfig::default();
        config.governor.requests_per_day = 0;
        assert_eq!(
            config.validate(),
            Err(ValidationError::ZeroQuota("requests_per_day"))
        );
    }

    #[test]
    fn test_turn_deadline_must_beat_request_timeout() {
        let mut config = AppConfig::default();
        config.engagement.turn_deadline_secs = 30;
        assert_eq!(
            config.validate(),
            Err(ValidationError::TurnDeadlineExceedsRequestTimeout {
                turn_deadline_secs: 30,
                request_timeout_secs: 30,
            })
        );

        config.server.request_timeout_secs = 60;
        assert!(config.validate().is_ok());
    }
}
