//! Keyword heuristic used when the classification service is unavailable.

use once_cell::sync::Lazy;

use super::classification::{Classification, FraudCategory, Urgency};
use crate::domain::intelligence::KeywordMatcher;

/// Distinct matches required before the heuristic calls a message fraud.
const MIN_FRAUD_MATCHES: usize = 2;
const CONFIDENCE_PER_MATCH: f64 = 0.25;
const MAX_FALLBACK_CONFIDENCE: f64 = 0.95;
const MEDIUM_URGENCY_MATCHES: usize = 3;

/// Vocabulary for the keyword-overlap heuristic.
pub const DETECTION_KEYWORDS: &[&str] = &[
    // Urgency and threats
    "urgent",
    "immediately",
    "today",
    "blocked",
    "suspended",
    "deactivated",
    "expire",
    "expired",
    "expires",
    "penalty",
    "legal action",
    "arrest",
    "police",
    // Institutions
    "sbi",
    "hdfc",
    "icici",
    "rbi",
    "bank",
    "customer care",
    "microsoft",
    "apple",
    "tech support",
    // Money movement
    "upi",
    "account",
    "transfer",
    "pay",
    "payment",
    "send money",
    "fee",
    "refund",
    "cashback",
    "processing fee",
    "registration fee",
    "training fee",
    // Credentials
    "verify",
    "kyc",
    "otp",
    "cvv",
    "pin",
    "password",
    "confirm",
    "update",
    // Prizes
    "won",
    "winner",
    "prize",
    "lottery",
    "lucky draw",
    "congratulations",
    "gift card",
    "free",
    "claim",
    // Investment
    "investment",
    "guaranteed",
    "returns",
    "double",
    "crypto",
    "profit",
    // Jobs
    "selected",
    "shortlisted",
    "job",
    "work from home",
    "salary",
    "hiring",
    // Links and devices
    "click",
    "link",
    "http",
    "www",
    "download",
    "virus",
    "hacked",
    "compromised",
    "alert",
    "security",
];

struct CategoryFamily {
    category: FraudCategory,
    matcher: KeywordMatcher,
    matches_at_sign: bool,
}

// Checked in order; the first family with a hit wins.
static CATEGORY_FAMILIES: Lazy<Vec<CategoryFamily>> = Lazy::new(|| {
    let family = |category, terms: &[&str], matches_at_sign| CategoryFamily {
        category,
        matcher: KeywordMatcher::new(terms),
        matches_at_sign,
    };
    vec![
        family(FraudCategory::BankFraud, &["bank", "account", "kyc"], false),
        family(FraudCategory::UpiFraud, &["upi"], true),
        family(FraudCategory::Phishing, &["http", "link", "click"], false),
        family(FraudCategory::Lottery, &["prize", "lottery", "winner"], false),
        family(
            FraudCategory::JobScam,
            &["job", "work from home", "registration"],
            false,
        ),
        family(
            FraudCategory::Investment,
            &["investment", "returns", "double"],
            false,
        ),
        family(
            FraudCategory::TechSupport,
            &["virus", "microsoft", "tech support"],
            false,
        ),
    ]
});

static CRITICAL_TERMS: Lazy<KeywordMatcher> = Lazy::new(|| {
    KeywordMatcher::new(&["blocked", "suspended", "arrest", "legal", "legal action"])
});

static HIGH_TERMS: Lazy<KeywordMatcher> =
    Lazy::new(|| KeywordMatcher::new(&["urgent", "immediately", "now", "today"]));

/// Local classifier built on keyword overlap.
#[derive(Debug)]
pub struct KeywordFallbackClassifier {
    vocabulary: KeywordMatcher,
}

impl KeywordFallbackClassifier {
    pub fn new() -> Self {
        Self::with_vocabulary(DETECTION_KEYWORDS)
    }

    pub fn with_vocabulary(vocabulary: &[&str]) -> Self {
        Self {
            vocabulary: KeywordMatcher::new(vocabulary),
        }
    }

    /// Classifies `text` from distinct vocabulary matches.
    pub fn classify(&self, text: &str) -> Classification {
        let matches = self.vocabulary.count_distinct(text);
        let is_fraud = matches >= MIN_FRAUD_MATCHES;
        let confidence = (CONFIDENCE_PER_MATCH * matches as f64).min(MAX_FALLBACK_CONFIDENCE);

        Classification::new(
            is_fraud,
            confidence,
            infer_category(text),
            infer_urgency(text, matches),
        )
    }
}

impl Default for KeywordFallbackClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn infer_category(text: &str) -> FraudCategory {
    CATEGORY_FAMILIES
        .iter()
        .find(|family| {
            (family.matches_at_sign && text.contains('@'))
                || family.matcher.count_distinct(text) > 0
        })
        .map(|family| family.category.clone())
        .unwrap_or(FraudCategory::Other)
}

fn infer_urgency(text: &str, matches: usize) -> Urgency {
    if CRITICAL_TERMS.count_distinct(text) > 0 {
        Urgency::Critical
    } else if HIGH_TERMS.count_distinct(text) > 0 {
        Urgency::High
    } else if matches >= MEDIUM_URGENCY_MATCHES {
        Urgency::Medium
    } else {
        Urgency::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Classification {
        KeywordFallbackClassifier::new().classify(text)
    }

    mod verdict {
        use super::*;

        #[test]
        fn single_match_is_not_fraud() {
            let c = classify("See you today");
            assert!(!c.is_fraud);
            assert_eq!(c.confidence, 0.25);
        }

        #[test]
        fn two_matches_is_fraud_with_scaled_confidence() {
            let c = classify("Please verify your kyc");
            assert!(c.is_fraud);
            assert_eq!(c.confidence, 0.5);
        }

        #[test]
        fn confidence_caps_below_one() {
            let c = classify(
                "URGENT: your SBI account is blocked. Verify KYC, share OTP and PIN immediately",
            );
            assert!(c.is_fraud);
            assert_eq!(c.confidence, 0.95);
        }

        #[test]
        fn no_matches_is_benign() {
            let c = classify("hello there");
            assert!(!c.is_fraud);
            assert_eq!(c.confidence, 0.0);
            assert_eq!(c.category, FraudCategory::Other);
            assert_eq!(c.urgency, Urgency::Low);
        }
    }

    mod category {
        use super::*;

        #[test]
        fn bank_terms_win_first() {
            assert_eq!(
                classify("your bank account needs a link").category,
                FraudCategory::BankFraud
            );
        }

        #[test]
        fn at_sign_implies_upi() {
            assert_eq!(classify("send to refund@ybl").category, FraudCategory::UpiFraud);
        }

        #[test]
        fn families_in_order() {
            assert_eq!(classify("click this").category, FraudCategory::Phishing);
            assert_eq!(classify("you are a winner").category, FraudCategory::Lottery);
            assert_eq!(classify("work from home offer").category, FraudCategory::JobScam);
            assert_eq!(classify("double your returns").category, FraudCategory::Investment);
            assert_eq!(classify("virus detected").category, FraudCategory::TechSupport);
        }
    }

    mod urgency {
        use super::*;

        #[test]
        fn threats_are_critical() {
            assert_eq!(classify("account blocked").urgency, Urgency::Critical);
        }

        #[test]
        fn time_pressure_is_high() {
            assert_eq!(classify("pay now").urgency, Urgency::High);
        }

        #[test]
        fn many_matches_are_medium() {
            assert_eq!(classify("verify kyc otp").urgency, Urgency::Medium);
        }
    }
}
