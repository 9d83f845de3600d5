//! Completion module - when a session has produced enough, and what gets reported.

mod policy;
mod summary;

pub use policy::{CompletionPolicy, CompletionTrigger, DEFAULT_MAX_MESSAGES, DEFAULT_SCORE_THRESHOLD};
pub use summary::{CompletionSummary, ReportedIntelligence};
