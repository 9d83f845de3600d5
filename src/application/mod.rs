//! Application layer - composes domain services and ports.
//!
//! - `ConversationOrchestrator` - the per-message pipeline
//! - `CompletionReporter` - background summary delivery
//! - `SessionSweeper` - background expiry
//! - `EngineMetrics` - process counters

mod completion_reporter;
mod metrics;
mod orchestrator;
mod prompts;
mod session_sweeper;

pub use completion_reporter::CompletionReporter;
pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use orchestrator::{
    ConversationOrchestrator, InboundMessage, OrchestratorSettings, TurnOutcome,
};
pub use prompts::{reply_context, CLASSIFY_INSTRUCTIONS};
pub use session_sweeper::{SessionSweeper, SessionSweeperConfig};
