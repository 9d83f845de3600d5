//! The static persona catalog.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::detection::FraudCategory;
use crate::domain::foundation::ValidationError;

/// Identifier of a catalog persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaId {
    ElderlyConfused,
    BusyProfessional,
    CuriousStudent,
    TechNaiveParent,
    DesperateJobSeeker,
}

impl PersonaId {
    pub const ALL: [PersonaId; 5] = [
        PersonaId::ElderlyConfused,
        PersonaId::BusyProfessional,
        PersonaId::CuriousStudent,
        PersonaId::TechNaiveParent,
        PersonaId::DesperateJobSeeker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ElderlyConfused => "elderly_confused",
            Self::BusyProfessional => "busy_professional",
            Self::CuriousStudent => "curious_student",
            Self::TechNaiveParent => "tech_naive_parent",
            Self::DesperateJobSeeker => "desperate_job_seeker",
        }
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PersonaId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PersonaId::ALL
            .into_iter()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| ValidationError::invalid_format("persona", format!("unknown persona '{}'", s)))
    }
}

/// How a persona responds to pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrgencyAffinity {
    /// Preferred under high or critical urgency. Lower rank wins.
    HighVulnerability { rank: u8 },
    /// Chosen only by the uniform draw.
    Standard,
}

/// A catalog entry. Read-only at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaProfile {
    pub id: PersonaId,
    pub display_name: &'static str,
    pub applicable_categories: Vec<FraudCategory>,
    pub urgency_affinity: UrgencyAffinity,
    pub tone: &'static str,
}

impl PersonaProfile {
    pub fn applies_to(&self, category: &FraudCategory) -> bool {
        self.applicable_categories.contains(category)
    }

    /// Rank under pressure, if this persona is a high-vulnerability one.
    pub fn vulnerability_rank(&self) -> Option<u8> {
        match self.urgency_affinity {
            UrgencyAffinity::HighVulnerability { rank } => Some(rank),
            UrgencyAffinity::Standard => None,
        }
    }
}

/// General-purpose personas used when no catalog entry fits a category.
pub const DEFAULT_PERSONAS: [PersonaId; 2] =
    [PersonaId::TechNaiveParent, PersonaId::BusyProfessional];

static STANDARD_CATALOG: Lazy<Vec<PersonaProfile>> = Lazy::new(|| {
    use FraudCategory::*;
    vec![
        PersonaProfile {
            id: PersonaId::ElderlyConfused,
            display_name: "Kamala, retired schoolteacher",
            applicable_categories: vec![BankFraud, TechSupport, Lottery, Other],
            urgency_affinity: UrgencyAffinity::HighVulnerability { rank: 0 },
            tone: "Polite, slow and easily confused by technology. Asks the same thing twice and worries about her pension.",
        },
        PersonaProfile {
            id: PersonaId::BusyProfessional,
            display_name: "Rohan, sales manager",
            applicable_categories: vec![UpiFraud, Phishing, FakeOffer],
            urgency_affinity: UrgencyAffinity::Standard,
            tone: "Distracted and brief. Replies between meetings and wants the problem gone quickly.",
        },
        PersonaProfile {
            id: PersonaId::CuriousStudent,
            display_name: "Priya, college student",
            applicable_categories: vec![Investment, FakeOffer, Romance, JobScam],
            urgency_affinity: UrgencyAffinity::Standard,
            tone: "Eager and informal. Excited by opportunities and asks lots of follow-up questions.",
        },
        PersonaProfile {
            id: PersonaId::TechNaiveParent,
            display_name: "Suresh, shop owner and father of two",
            applicable_categories: vec![BankFraud, UpiFraud, Phishing],
            urgency_affinity: UrgencyAffinity::HighVulnerability { rank: 1 },
            tone: "Anxious about family savings. Uses UPI daily but does not understand how it works.",
        },
        PersonaProfile {
            id: PersonaId::DesperateJobSeeker,
            display_name: "Arjun, recent graduate",
            applicable_categories: vec![JobScam, Investment, FakeOffer],
            urgency_affinity: UrgencyAffinity::Standard,
            tone: "Hopeful and anxious to please. Willing to pay small fees for a chance at work.",
        },
    ]
});

/// The built-in persona catalog.
pub fn standard_catalog() -> &'static [PersonaProfile] {
    &STANDARD_CATALOG
}
