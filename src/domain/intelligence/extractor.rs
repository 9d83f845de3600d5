//! Structural pattern extraction of artifacts from counterparty text.

use once_cell::sync::Lazy;
use regex::Regex;

use super::keywords::KeywordMatcher;
use super::record::{IntelligenceCategory, IntelligenceRecord};

/// Risk vocabulary recorded as suspicious keywords.
pub const RISK_KEYWORDS: &[&str] = &[
    "urgent",
    "immediately",
    "verify",
    "blocked",
    "suspended",
    "expired",
    "prize",
    "won",
    "winner",
    "claim",
    "free",
    "gift",
    "offer",
    "account",
    "bank",
    "upi",
    "payment",
    "transfer",
    "send money",
    "otp",
    "password",
    "pin",
    "cvv",
    "confirm",
    "update",
    "kyc",
    "legal action",
    "police",
    "arrest",
    "penalty",
    "fine",
];

/// Providers whose addresses are personal email, not payment handles.
const PERSONAL_EMAIL_PROVIDERS: &[&str] = &[
    "gmail",
    "yahoo",
    "hotmail",
    "outlook",
    "email",
    "mail",
    "icloud",
    "protonmail",
    "rediffmail",
    "live",
];

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bhttps?://[^\s<>"'`]+"#).expect("valid url regex")
});

static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+91[\s-]?|\b91[\s-]|\b)([6-9]\d{9})\b").expect("valid phone regex")
});

static DIGIT_RUN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{9,18}\b").expect("valid digit run regex"));

static PHONE_SHAPED_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:91)?[6-9]\d{9}$").expect("valid phone shape regex"));

static UPI_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[a-zA-Z0-9._-]{2,256}@([a-zA-Z][a-zA-Z0-9]{1,63})\b").expect("valid upi regex")
});

static RISK_MATCHER: Lazy<KeywordMatcher> = Lazy::new(|| KeywordMatcher::new(RISK_KEYWORDS));

/// Extracts a partial `IntelligenceRecord` from a single message.
///
/// Rules are purely structural; nothing here consults the generation service.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntelligenceExtractor;

impl IntelligenceExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Runs every extraction rule over `text`.
    pub fn extract(&self, text: &str) -> IntelligenceRecord {
        let mut record = IntelligenceRecord::new();

        for link in URL_PATTERN.find_iter(text) {
            record.insert(IntelligenceCategory::PhishingLinks, link.as_str());
        }

        // Digits and handles inside a link belong to the link.
        let remainder = URL_PATTERN.replace_all(text, " ");

        for caps in PHONE_PATTERN.captures_iter(&remainder) {
            if let Some(number) = caps.get(1) {
                record.insert(IntelligenceCategory::PhoneNumbers, number.as_str());
            }
        }

        for run in DIGIT_RUN_PATTERN.find_iter(&remainder) {
            let digits = run.as_str();
            if PHONE_SHAPED_RUN.is_match(digits) {
                record.insert(IntelligenceCategory::PhoneNumbers, digits);
            } else {
                record.insert(IntelligenceCategory::BankAccounts, digits);
            }
        }

        for caps in UPI_PATTERN.captures_iter(&remainder) {
            let (Some(whole), Some(provider)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if is_personal_email(provider.as_str()) || continues_as_domain(&remainder, whole.end())
            {
                continue;
            }
            record.insert(IntelligenceCategory::UpiIds, whole.as_str());
        }

        for keyword in RISK_MATCHER.find(text) {
            record.insert(IntelligenceCategory::SuspiciousKeywords, &keyword);
        }

        record
    }
}

fn is_personal_email(provider: &str) -> bool {
    let provider = provider.to_lowercase();
    PERSONAL_EMAIL_PROVIDERS.contains(&provider.as_str())
}

/// An `@token` followed by `.tld` is an email domain, not a payment handle.
fn continues_as_domain(text: &str, end: usize) -> bool {
    let mut rest = text[end..].chars();
    matches!(
        (rest.next(), rest.next()),
        (Some('.'), Some(c)) if c.is_ascii_alphabetic()
    )
}
