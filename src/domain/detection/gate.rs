//! DetectionGate - the observing → engaged transition.

use super::classification::Classification;
use crate::domain::session::Session;

/// Confidence at or above which a fraud verdict engages a session.
pub const DEFAULT_DETECTION_THRESHOLD: f64 = 0.65;

/// Outcome of presenting a classification to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The session was observing and is now engaged.
    Activated,
    /// The verdict did not clear the gate; the session keeps observing.
    Observing,
    /// The session was engaged earlier; its verdict is frozen.
    AlreadyEngaged,
}

/// Decides whether a classification engages a session.
#[derive(Debug, Clone, Copy)]
pub struct DetectionGate {
    threshold: f64,
}

impl DetectionGate {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// True if the verdict clears the gate on its own merits.
    pub fn clears(&self, classification: &Classification) -> bool {
        classification.is_fraud && classification.confidence >= self.threshold
    }

    /// Applies a verdict to the session, engaging it at most once.
    ///
    /// Confidence and category are recorded only at activation and never
    /// revisited afterwards.
    pub fn apply(&self, session: &mut Session, classification: &Classification) -> GateDecision {
        if session.is_engaged() {
            return GateDecision::AlreadyEngaged;
        }
        if !self.clears(classification) {
            return GateDecision::Observing;
        }
        if session.engage(classification.confidence, classification.category.clone()) {
            GateDecision::Activated
        } else {
            GateDecision::AlreadyEngaged
        }
    }
}

impl Default for DetectionGate {
    fn default() -> Self {
        Self::new(DEFAULT_DETECTION_THRESHOLD)
    }
}
