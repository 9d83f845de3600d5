//! Intelligence module - artifacts extracted from counterparty text.
//!
//! - `IntelligenceRecord` - five deduplicated, normalized sets that only grow
//! - `IntelligenceExtractor` - structural pattern rules over free text
//! - `KeywordMatcher` - whole-token, case-insensitive vocabulary matching

mod extractor;
mod keywords;
mod record;

pub use extractor::{IntelligenceExtractor, RISK_KEYWORDS};
pub use keywords::KeywordMatcher;
pub use record::{IntelligenceCategory, IntelligenceRecord};
