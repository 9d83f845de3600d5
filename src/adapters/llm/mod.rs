//! Text generation adapters.
//!
//! - `ChatCompletionsGenerator` - OpenAI-compatible chat-completions client
//! - `GovernedGenerator` - quota, timeout and retry decorator
//! - `UnconfiguredGenerator` - stands in when no API key is configured
//! - `MockGenerator` - scripted outcomes for tests

mod chat_completions;
mod governed;
mod mock;
mod parsing;
mod unconfigured;

pub use chat_completions::{ChatCompletionsConfig, ChatCompletionsGenerator};
pub use governed::{GovernedGenerator, RetryPolicy};
pub use mock::MockGenerator;
pub use parsing::{extract_json_object, parse_classification};
pub use unconfigured::UnconfiguredGenerator;
