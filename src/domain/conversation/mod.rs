//! Conversation module - how the engine talks once a session is engaged.
//!
//! - `DialogueStage` - tactical stage derived from turn count and captures
//! - `fallback_reply` / `NEUTRAL_REPLY` - replies produced without the generator
//! - `ReplySanitizer` - cleaning and rejection of generated replies

mod replies;
mod sanitizer;
mod stage;

pub use replies::{fallback_reply, NEUTRAL_REPLY};
pub use sanitizer::{ReplySanitizer, SanitizationError, MAX_REPLY_CHARS, MIN_REPLY_CHARS};
pub use stage::DialogueStage;
