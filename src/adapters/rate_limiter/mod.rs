//! Quota gate adapters.
//!
//! ## Available Adapters
//!
//! - `SlidingWindowGovernor` - in-process four-quota sliding windows
//!
//! ## Usage
//!
//! ```ignore
//! use honeypot_engine::adapters::rate_limiter::{QuotaConfig, SlidingWindowGovernor};
//!
//! let governor = SlidingWindowGovernor::new(QuotaConfig::default(), Arc::new(SystemClock));
//! let waited = governor.acquire(request.estimated_tokens()).await?;
//! ```

mod config;
mod sliding_window;

pub use config::QuotaConfig;
pub use sliding_window::SlidingWindowGovernor;
