//! Dialogue stages within an engaged conversation.
//!
//! The stage is never stored. It is derived from the turn count and whether
//! any artifact has been captured, every time a reply is requested.

use serde::{Deserialize, Serialize};

/// Tactical stage of the dialogue.
///
/// Stages flow in a fixed order driven by the turn count:
/// - `InitialHook` → `Engagement` → `InformationProbe`
/// - then `Resistance` → `IntelligenceMining` while nothing has been captured,
///   or `GradualCompliance` as soon as something has
/// - `Prolongation` once the conversation runs long
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueStage {
    /// React to the opening claim with surprise and concern.
    InitialHook,
    /// Show interest and ask what happens next.
    Engagement,
    /// Ask who they are and how the process works.
    InformationProbe,
    /// Hesitate and ask for proof before going further.
    Resistance,
    /// Appear to comply while asking for the details needed to do so.
    GradualCompliance,
    /// Press for payment details, numbers and links.
    IntelligenceMining,
    /// Stall with plausible problems to keep them talking.
    Prolongation,
}

impl DialogueStage {
    pub const ALL: [DialogueStage; 7] = [
        DialogueStage::InitialHook,
        DialogueStage::Engagement,
        DialogueStage::InformationProbe,
        DialogueStage::Resistance,
        DialogueStage::GradualCompliance,
        DialogueStage::IntelligenceMining,
        DialogueStage::Prolongation,
    ];

    /// Derives the stage. Total and pure over its inputs.
    pub fn derive(message_count: u32, has_intelligence: bool) -> Self {
        match message_count {
            0..=2 => Self::InitialHook,
            3..=4 => Self::Engagement,
            5..=6 => Self::InformationProbe,
            7..=12 if has_intelligence => Self::GradualCompliance,
            7..=8 => Self::Resistance,
            9..=12 => Self::IntelligenceMining,
            _ => Self::Prolongation,
        }
    }

    /// Tactical guidance handed to the generation service for this stage.
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::InitialHook => {
                "React with surprise and concern. Ask what happened and why. Show you believe them but are confused."
            }
            Self::Engagement => {
                "Show interest in resolving the problem. Ask what you need to do and mention small worries."
            }
            Self::InformationProbe => {
                "Ask who they are, which office they are calling from, and how the process works. Sound cooperative."
            }
            Self::Resistance => {
                "Hesitate a little. Say a relative warned you about fraud and ask them to prove they are genuine."
            }
            Self::GradualCompliance => {
                "Agree to go ahead but ask them to repeat the exact account number, UPI ID or link so you get it right."
            }
            Self::IntelligenceMining => {
                "Act ready to pay. Ask where exactly to send the money and for an alternate number or UPI ID in case it fails."
            }
            Self::Prolongation => {
                "Stall with believable problems: the app is slow, the link will not open, the OTP has not arrived. Ask them to resend details."
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::InitialHook => "initial_hook",
            Self::Engagement => "engagement",
            Self::InformationProbe => "information_probe",
            Self::Resistance => "resistance",
            Self::GradualCompliance => "gradual_compliance",
            Self::IntelligenceMining => "intelligence_mining",
            Self::Prolongation => "prolongation",
        }
    }

    /// Position in `ALL`.
    pub fn ordinal(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }
}

impl Default for DialogueStage {
    fn default() -> Self {
        Self::InitialHook
    }
}

impl std::fmt::Display for DialogueStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
