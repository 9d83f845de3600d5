//! Parsing of generation service output.
//!
//! Model output is untrusted text. Anything that does not have the expected
//! shape becomes `GenerationFailure::Malformed`; nothing here panics.

use serde_json::Value;

use crate::domain::detection::{Classification, FraudCategory, Urgency};
use crate::ports::GenerationFailure;

const VERDICT_KEYS: &[&str] = &["is_scam", "isFraud", "is_fraud", "isScam"];
const CATEGORY_KEYS: &[&str] = &["scam_type", "category", "fraud_category", "fraudCategory"];
const URGENCY_KEYS: &[&str] = &["urgency_level", "urgency"];

/// Finds the first JSON object in `text`.
///
/// Handles fenced code blocks and prose around the object. String literals
/// are respected when balancing braces.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let trimmed = text.trim();

    for fence in ["```json", "```"] {
        if let Some(start) = trimmed.find(fence) {
            let body_start = start + fence.len();
            if let Some(len) = trimmed[body_start..].find("```") {
                let body = trimmed[body_start..body_start + len].trim();
                if let Some(object) = balanced_object(body) {
                    return Some(object);
                }
            }
        }
    }

    balanced_object(trimmed)
}

fn balanced_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, c) in s[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&s[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses a classification verdict.
///
/// The verdict and confidence are required; category defaults to `other`
/// and urgency to `medium`.
pub fn parse_classification(content: &str) -> Result<Classification, GenerationFailure> {
    let json = extract_json_object(content)
        .ok_or_else(|| GenerationFailure::malformed("no JSON object in classification"))?;
    let value: Value = serde_json::from_str(json)
        .map_err(|e| GenerationFailure::malformed(format!("invalid classification JSON: {}", e)))?;

    let verdict = first_key(&value, VERDICT_KEYS)
        .and_then(as_bool)
        .ok_or_else(|| GenerationFailure::malformed("classification lacks a verdict"))?;

    let confidence = value
        .get("confidence")
        .and_then(as_f64)
        .ok_or_else(|| GenerationFailure::malformed("classification lacks a confidence"))?;

    let category = first_key(&value, CATEGORY_KEYS)
        .and_then(Value::as_str)
        .map(FraudCategory::parse)
        .unwrap_or(FraudCategory::Other);

    let urgency = first_key(&value, URGENCY_KEYS)
        .and_then(Value::as_str)
        .map(Urgency::parse)
        .unwrap_or_default();

    Ok(Classification::new(verdict, confidence, category, urgency))
}

fn first_key<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| value.get(*key))
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
