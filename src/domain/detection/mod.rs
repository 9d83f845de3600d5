//! Detection module - deciding whether a conversation is a fraud attempt.
//!
//! - `Classification` - the typed verdict for one message
//! - `DetectionGate` - the observing → engaged transition
//! - `KeywordFallbackClassifier` - local verdict when the classifier is unavailable

mod classification;
mod fallback;
mod gate;

pub use classification::{Classification, FraudCategory, Urgency};
pub use fallback::{KeywordFallbackClassifier, DETECTION_KEYWORDS};
pub use gate::{DetectionGate, GateDecision, DEFAULT_DETECTION_THRESHOLD};
