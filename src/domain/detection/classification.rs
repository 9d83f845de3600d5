//! Classification verdicts and the vocabularies they use.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of fraud a conversation has been classified as.
///
/// Labels the classifier produces outside the known set are preserved as
/// `Unrecognized` so they still reach the evaluator verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FraudCategory {
    BankFraud,
    UpiFraud,
    Phishing,
    FakeOffer,
    TechSupport,
    Lottery,
    Romance,
    Investment,
    JobScam,
    Other,
    Unrecognized(String),
}

impl FraudCategory {
    /// Parses a label leniently: case, surrounding whitespace, hyphens and
    /// spaces are ignored.
    pub fn parse(label: &str) -> Self {
        let normalized = label.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "bank_fraud" => Self::BankFraud,
            "upi_fraud" => Self::UpiFraud,
            "phishing" => Self::Phishing,
            "fake_offer" => Self::FakeOffer,
            "tech_support" => Self::TechSupport,
            "lottery" => Self::Lottery,
            "romance" => Self::Romance,
            "investment" => Self::Investment,
            "job_scam" => Self::JobScam,
            "other" | "" => Self::Other,
            _ => Self::Unrecognized(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::BankFraud => "bank_fraud",
            Self::UpiFraud => "upi_fraud",
            Self::Phishing => "phishing",
            Self::FakeOffer => "fake_offer",
            Self::TechSupport => "tech_support",
            Self::Lottery => "lottery",
            Self::Romance => "romance",
            Self::Investment => "investment",
            Self::JobScam => "job_scam",
            Self::Other => "other",
            Self::Unrecognized(label) => label,
        }
    }
}

impl fmt::Display for FraudCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for FraudCategory {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

impl From<FraudCategory> for String {
    fn from(category: FraudCategory) -> Self {
        category.as_str().to_string()
    }
}

/// How hard the counterparty is pushing for action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    /// Parses a label, defaulting to `Medium` for anything unknown.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Medium,
        }
    }

    /// True for the levels that favour a high-vulnerability persona.
    pub fn is_pressing(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl Default for Urgency {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Verdict for a single counterparty message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub is_fraud: bool,
    pub confidence: f64,
    pub category: FraudCategory,
    pub urgency: Urgency,
}

impl Classification {
    /// Creates a classification, clamping confidence into [0, 1].
    ///
    /// Non-finite confidences collapse to 0.
    pub fn new(is_fraud: bool, confidence: f64, category: FraudCategory, urgency: Urgency) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            is_fraud,
            confidence,
            category,
            urgency,
        }
    }

    /// A benign verdict.
    pub fn benign() -> Self {
        Self::new(false, 0.0, FraudCategory::Other, Urgency::Low)
    }
}
