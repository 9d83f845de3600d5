//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the engine to external systems:
//! - `llm` - generation service clients (chat completions, governed, mock)
//! - `rate_limiter` - sliding-window quota governor
//! - `storage` - in-memory session store
//! - `callback` - evaluator clients
//! - `clock` - system and manual clocks
//! - `http` - axum REST surface

pub mod callback;
pub mod clock;
pub mod http;
pub mod llm;
pub mod rate_limiter;
pub mod storage;
