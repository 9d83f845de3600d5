//! IntelligenceRecord - the accumulated artifacts of one session.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Weight of each bank account in the value score.
const BANK_ACCOUNT_WEIGHT: f64 = 3.0;
/// Weight of each payment identifier in the value score.
const UPI_ID_WEIGHT: f64 = 2.0;
/// Weight of each link in the value score.
const PHISHING_LINK_WEIGHT: f64 = 2.0;
/// Weight of each phone number in the value score.
const PHONE_NUMBER_WEIGHT: f64 = 1.0;
/// Weight of each keyword in the value score.
const KEYWORD_WEIGHT: f64 = 0.5;
/// Keywords beyond this count add nothing to the score.
const KEYWORD_CAP: usize = 5;
/// Applied when at least `DIVERSITY_MIN_CATEGORIES` artifact categories are present.
const DIVERSITY_MULTIPLIER: f64 = 1.2;
const DIVERSITY_MIN_CATEGORIES: usize = 3;

/// The five artifact categories a record tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntelligenceCategory {
    BankAccounts,
    UpiIds,
    PhoneNumbers,
    PhishingLinks,
    SuspiciousKeywords,
}

impl IntelligenceCategory {
    /// All categories, in reporting order.
    pub const ALL: [IntelligenceCategory; 5] = [
        IntelligenceCategory::BankAccounts,
        IntelligenceCategory::UpiIds,
        IntelligenceCategory::PhoneNumbers,
        IntelligenceCategory::PhishingLinks,
        IntelligenceCategory::SuspiciousKeywords,
    ];

    /// Returns true for the structured artifact categories (everything but keywords).
    pub fn is_artifact(&self) -> bool {
        !matches!(self, IntelligenceCategory::SuspiciousKeywords)
    }

    /// Normalizes a raw value for storage in this category.
    ///
    /// Returns `None` when nothing meaningful remains after normalization.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        let normalized = match self {
            IntelligenceCategory::BankAccounts => {
                trimmed.chars().filter(|c| c.is_ascii_digit()).collect()
            }
            IntelligenceCategory::PhoneNumbers => {
                let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
                // Country-code prefixes are dropped; the local ten digits identify the line.
                let skip = digits.len().saturating_sub(10);
                digits[skip..].to_string()
            }
            IntelligenceCategory::UpiIds => trimmed.to_lowercase(),
            IntelligenceCategory::PhishingLinks => trimmed
                .trim_end_matches(|c: char| c.is_whitespace() || ".,;:!?)]}'\"".contains(c))
                .to_string(),
            IntelligenceCategory::SuspiciousKeywords => trimmed
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase(),
        };

        if normalized.is_empty() {
            None
        } else {
            Some(normalized)
        }
    }
}

/// Deduplicated, normalized artifacts extracted from counterparty text.
///
/// Sets only grow: there is no removal API. Sorted sets keep the reported
/// arrays stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelligenceRecord {
    #[serde(default)]
    pub bank_accounts: BTreeSet<String>,
    #[serde(default)]
    pub upi_ids: BTreeSet<String>,
    #[serde(default)]
    pub phone_numbers: BTreeSet<String>,
    #[serde(default)]
    pub phishing_links: BTreeSet<String>,
    #[serde(default)]
    pub suspicious_keywords: BTreeSet<String>,
}

impl IntelligenceRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the set for a category.
    pub fn get(&self, category: IntelligenceCategory) -> &BTreeSet<String> {
        match category {
            IntelligenceCategory::BankAccounts => &self.bank_accounts,
            IntelligenceCategory::UpiIds => &self.upi_ids,
            IntelligenceCategory::PhoneNumbers => &self.phone_numbers,
            IntelligenceCategory::PhishingLinks => &self.phishing_links,
            IntelligenceCategory::SuspiciousKeywords => &self.suspicious_keywords,
        }
    }

    fn get_mut(&mut self, category: IntelligenceCategory) -> &mut BTreeSet<String> {
        match category {
            IntelligenceCategory::BankAccounts => &mut self.bank_accounts,
            IntelligenceCategory::UpiIds => &mut self.upi_ids,
            IntelligenceCategory::PhoneNumbers => &mut self.phone_numbers,
            IntelligenceCategory::PhishingLinks => &mut self.phishing_links,
            IntelligenceCategory::SuspiciousKeywords => &mut self.suspicious_keywords,
        }
    }

    /// Normalizes and inserts a value. Returns true if the record grew.
    pub fn insert(&mut self, category: IntelligenceCategory, raw: &str) -> bool {
        match category.normalize(raw) {
            Some(value) => self.get_mut(category).insert(value),
            None => false,
        }
    }

    /// Builder-style insert, mostly for tests and fixtures.
    pub fn with(mut self, category: IntelligenceCategory, raw: &str) -> Self {
        self.insert(category, raw);
        self
    }

    /// Unions `partial` into this record in place. Returns the number of new items.
    ///
    /// Merging the same partial twice has no additional effect.
    pub fn merge(&mut self, partial: &IntelligenceRecord) -> usize {
        let mut added = 0;
        for category in IntelligenceCategory::ALL {
            for value in partial.get(category) {
                if self.insert(category, value) {
                    added += 1;
                }
            }
        }
        added
    }

    /// Total number of items across all five categories.
    pub fn total_items(&self) -> usize {
        IntelligenceCategory::ALL
            .iter()
            .map(|c| self.get(*c).len())
            .sum()
    }

    /// True if any structured artifact (not just keywords) has been captured.
    pub fn has_any_intelligence(&self) -> bool {
        self.artifact_categories_present() > 0
    }

    /// True if every category is empty.
    pub fn is_empty(&self) -> bool {
        self.total_items() == 0
    }

    fn artifact_categories_present(&self) -> usize {
        IntelligenceCategory::ALL
            .iter()
            .filter(|c| c.is_artifact() && !self.get(**c).is_empty())
            .count()
    }

    /// Value score of the record, rounded to two decimals.
    ///
    /// Recomputed on every call; the record does not cache it.
    pub fn score(&self) -> f64 {
        let keywords = self.suspicious_keywords.len().min(KEYWORD_CAP);

        let mut score = BANK_ACCOUNT_WEIGHT * self.bank_accounts.len() as f64
            + UPI_ID_WEIGHT * self.upi_ids.len() as f64
            + PHISHING_LINK_WEIGHT * self.phishing_links.len() as f64
            + PHONE_NUMBER_WEIGHT * self.phone_numbers.len() as f64
            + KEYWORD_WEIGHT * keywords as f64;

        if self.artifact_categories_present() >= DIVERSITY_MIN_CATEGORIES {
            score *= DIVERSITY_MULTIPLIER;
        }

        (score * 100.0).round() / 100.0
    }
}
