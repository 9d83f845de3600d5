//! HTTP adapter - the engine's REST surface.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::EngineAppState;
pub use middleware::ApiKeyState;
pub use routes::{routes, with_middleware};
