//! Ports - the seams between the engine and the outside world.
//!
//! - `TextGenerator` - external generation/classification service
//! - `QuotaGate` - admission control in front of it
//! - `SessionStore` - session ownership, locking and expiry
//! - `EvaluatorClient` - completion summary delivery
//! - `Clock` - time source

mod clock;
mod evaluator;
mod generation;
mod rate_limiter;
mod session_store;

pub use clock::Clock;
pub use evaluator::{DeliveryError, EvaluatorClient};
pub use generation::{
    GeneratedContent, GenerationFailure, GenerationOutcome, GenerationRequest, GenerationTask,
    RequestMetadata, TextGenerator,
};
pub use rate_limiter::{QuotaExceeded, QuotaGate, QuotaUsage};
pub use session_store::{SessionGuard, SessionStore, SessionStoreError};
