//! Whole-token keyword matching over a fixed vocabulary.

use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;

/// Matches a fixed vocabulary against free text.
///
/// Terms are matched case-insensitively on word boundaries, so `pin` does not
/// fire inside `spinning`. Multi-word terms tolerate any run of whitespace
/// between their words.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    pattern: Option<Regex>,
}

impl KeywordMatcher {
    /// Compiles a matcher for the given vocabulary.
    pub fn new(vocabulary: &[&str]) -> Self {
        let alternatives: Vec<String> = vocabulary
            .iter()
            .map(|term| term.trim())
            .filter(|term| !term.is_empty())
            .map(|term| {
                term.split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+")
            })
            .collect();

        if alternatives.is_empty() {
            return Self { pattern: None };
        }

        // Escaped literals joined by alternation always form a valid pattern.
        let pattern = RegexBuilder::new(&format!(r"\b(?:{})\b", alternatives.join("|")))
            .case_insensitive(true)
            .build()
            .ok();

        Self { pattern }
    }

    /// Returns the distinct vocabulary terms present in `text`, lowercased.
    pub fn find(&self, text: &str) -> BTreeSet<String> {
        let Some(pattern) = &self.pattern else {
            return BTreeSet::new();
        };

        pattern
            .find_iter(text)
            .map(|m| {
                m.as_str()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
                    .to_lowercase()
            })
            .collect()
    }

    /// Counts distinct vocabulary terms present in `text`.
    pub fn count_distinct(&self, text: &str) -> usize {
        self.find(text).len()
    }
}
