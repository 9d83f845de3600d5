//! Evaluator client adapters.
//!
//! - `HttpEvaluatorClient` - POSTs summaries with bounded retry
//! - `RecordingEvaluator` - in-memory, for tests

mod http_evaluator;
mod recording;

pub use http_evaluator::{HttpEvaluatorClient, HttpEvaluatorConfig};
pub use recording::RecordingEvaluator;
