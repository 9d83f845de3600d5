//! Reply sanitation.
//!
//! Generated replies are cleaned of role prefixes and quoting, then rejected
//! if they would give away that no human is typing.

use thiserror::Error;

/// Replies shorter than this are treated as empty noise.
pub const MIN_REPLY_CHARS: usize = 5;

/// Replies longer than this do not read like a text message.
pub const MAX_REPLY_CHARS: usize = 300;

const ROLE_PREFIXES: &[&str] = &[
    "as the victim,",
    "here's my response:",
    "response:",
    "reply:",
    "victim:",
    "me:",
    "user:",
];

const DISCLOSURE_PHRASES: &[&str] = &[
    "as an ai",
    "i'm an ai",
    "i am an ai",
    "artificial intelligence",
    "language model",
    "i cannot",
    "i'm unable",
    "i apologize",
    "certainly!",
    "absolutely!",
    "here's",
    "sure thing",
];

const INJECTION_MARKERS: &[&str] = &[
    "```system",
    "```assistant",
    "[INST]",
    "[/INST]",
    "<|system|>",
    "<|assistant|>",
    "<|user|>",
    "<|im_start|>",
    "<|im_end|>",
    "<<SYS>>",
    "<</SYS>>",
];

/// Reasons a generated reply is unusable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SanitizationError {
    #[error("Reply too short: {actual} characters, minimum {min}")]
    TooShort { min: usize, actual: usize },

    #[error("Reply too long: {actual} characters, maximum {max}")]
    TooLong { max: usize, actual: usize },

    #[error("Reply discloses automation: contains '{phrase}'")]
    Disclosure { phrase: String },
}

/// Cleans and validates replies from the generation service.
#[derive(Debug, Clone, Default)]
pub struct ReplySanitizer;

impl ReplySanitizer {
    pub fn new() -> Self {
        Self
    }

    /// Returns the cleaned reply, or why it must be discarded.
    pub fn sanitize(&self, raw: &str) -> Result<String, SanitizationError> {
        let cleaned = self.clean(raw);
        self.validate(&cleaned)?;
        Ok(cleaned)
    }

    fn clean(&self, raw: &str) -> String {
        let mut text: String = raw
            .chars()
            .filter(|c| !c.is_control() || *c == '\n')
            .collect();

        for marker in INJECTION_MARKERS {
            text = text.replace(marker, "");
        }

        let mut text = text.trim().to_string();
        loop {
            let before = text.len();
            text = strip_quotes(&text).to_string();
            text = strip_role_prefix(&text).to_string();
            if text.len() == before {
                break;
            }
        }
        text
    }

    fn validate(&self, text: &str) -> Result<(), SanitizationError> {
        let chars = text.chars().count();
        if chars < MIN_REPLY_CHARS {
            return Err(SanitizationError::TooShort {
                min: MIN_REPLY_CHARS,
                actual: chars,
            });
        }
        if chars > MAX_REPLY_CHARS {
            return Err(SanitizationError::TooLong {
                max: MAX_REPLY_CHARS,
                actual: chars,
            });
        }

        let lowered = text.to_lowercase();
        if let Some(phrase) = DISCLOSURE_PHRASES.iter().find(|p| lowered.contains(*p)) {
            return Err(SanitizationError::Disclosure {
                phrase: phrase.to_string(),
            });
        }
        Ok(())
    }
}

fn strip_quotes(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '“' || c == '”')
        .trim()
}

fn strip_role_prefix(text: &str) -> &str {
    for prefix in ROLE_PREFIXES {
        let matches = text
            .get(..prefix.len())
            .map_or(false, |head| head.eq_ignore_ascii_case(prefix));
        if matches {
            return text[prefix.len()..].trim();
        }
    }
    text
}
