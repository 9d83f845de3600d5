//! System contexts for the two generation tasks.

use crate::domain::intelligence::{IntelligenceCategory, IntelligenceRecord};
use crate::domain::persona::PersonaProfile;

/// Instructions for the classification call. The model must answer with a
/// single JSON object.
pub const CLASSIFY_INSTRUCTIONS: &str = r#"You are a fraud detection system. Analyze the message and respond ONLY with valid JSON of this exact shape:
{
  "is_scam": true or false,
  "confidence": 0.0 to 1.0,
  "scam_type": "bank_fraud | upi_fraud | phishing | fake_offer | tech_support | lottery | romance | investment | job_scam | other",
  "urgency_level": "low | medium | high | critical"
}

Indicators:
- Urgency or threats: "account blocked", "immediate action", "legal action"
- Authority impersonation: bank, government, police, RBI
- Payment requests: UPI ids, bank accounts, "send money", "pay fees"
- Credential requests: OTP, PIN, KYC update, "verify your details"
- Suspicious or shortened links
- Offers too good to be true: prizes, guaranteed returns
- Job offers that require a registration or training fee

Use confidence above 0.7 when several indicators are present and 0.85 or more for clear fraud patterns."#;

const REPLY_RULES: &str = "Rules:
- Stay in character. You are a real person texting, never an assistant.
- Keep the reply to one to three short sentences.
- Show the emotion your character would feel and add slight hesitation.
- Ask questions that lead the other person to share payment details, account numbers, UPI ids or links.
- If they already shared details, ask clarifying questions about them.
- Output only the message text, without quotes or a speaker label.";

/// Standing instructions for reply generation in the persona's voice.
pub fn reply_context(profile: &PersonaProfile, intelligence: &IntelligenceRecord) -> String {
    let mut context = format!(
        "You are {}. {}\n\n{}",
        profile.display_name, profile.tone, REPLY_RULES
    );

    let gathered = gathered_summary(intelligence);
    if !gathered.is_empty() {
        context.push_str("\n\nAlready obtained: ");
        context.push_str(&gathered.join(", "));
        context.push_str(". Ask for something you do not have yet.");
    }
    context
}

fn gathered_summary(intelligence: &IntelligenceRecord) -> Vec<String> {
    IntelligenceCategory::ALL
        .iter()
        .filter(|c| c.is_artifact())
        .filter_map(|category| {
            let count = intelligence.get(*category).len();
            (count > 0).then(|| format!("{} {}", count, category_label(*category)))
        })
        .collect()
}

fn category_label(category: IntelligenceCategory) -> &'static str {
    match category {
        IntelligenceCategory::BankAccounts => "bank account(s)",
        IntelligenceCategory::UpiIds => "UPI id(s)",
        IntelligenceCategory::PhoneNumbers => "phone number(s)",
        IntelligenceCategory::PhishingLinks => "link(s)",
        IntelligenceCategory::SuspiciousKeywords => "keyword(s)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::persona::{standard_catalog, PersonaId};

    fn elderly() -> &'static PersonaProfile {
        standard_catalog()
            .iter()
            .find(|p| p.id == PersonaId::ElderlyConfused)
            .unwrap()
    }

    #[test]
    fn reply_context_names_the_persona() {
        let context = reply_context(elderly(), &IntelligenceRecord::new());
        assert!(context.starts_with("You are Kamala"));
        assert!(!context.contains("Already obtained"));
    }

    #[test]
    fn reply_context_lists_gathered_artifacts_only() {
        let record = IntelligenceRecord::new()
            .with(IntelligenceCategory::UpiIds, "fraud@ybl")
            .with(IntelligenceCategory::SuspiciousKeywords, "otp");
        let context = reply_context(elderly(), &record);
        assert!(context.contains("Already obtained: 1 UPI id(s)."));
        assert!(!context.contains("keyword"));
    }

    #[test]
    fn classify_instructions_request_json() {
        assert!(CLASSIFY_INSTRUCTIONS.contains("valid JSON"));
        assert!(CLASSIFY_INSTRUCTIONS.contains("urgency_level"));
    }
}
