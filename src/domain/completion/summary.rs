//! CompletionSummary - the payload delivered to the evaluator.

use serde::{Deserialize, Serialize};

use crate::domain::intelligence::IntelligenceRecord;
use crate::domain::session::Session;

/// Intelligence as reported: every category as an array, always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedIntelligence {
    pub bank_accounts: Vec<String>,
    pub upi_ids: Vec<String>,
    pub phishing_links: Vec<String>,
    pub phone_numbers: Vec<String>,
    pub suspicious_keywords: Vec<String>,
}

impl From<&IntelligenceRecord> for ReportedIntelligence {
    fn from(record: &IntelligenceRecord) -> Self {
        Self {
            bank_accounts: record.bank_accounts.iter().cloned().collect(),
            upi_ids: record.upi_ids.iter().cloned().collect(),
            phishing_links: record.phishing_links.iter().cloned().collect(),
            phone_numbers: record.phone_numbers.iter().cloned().collect(),
            suspicious_keywords: record.suspicious_keywords.iter().cloned().collect(),
        }
    }
}

impl ReportedIntelligence {
    pub fn total_items(&self) -> usize {
        self.bank_accounts.len()
            + self.upi_ids.len()
            + self.phishing_links.len()
            + self.phone_numbers.len()
            + self.suspicious_keywords.len()
    }
}

/// Final report for a completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSummary {
    pub session_id: String,
    pub fraud_detected: bool,
    pub total_messages: u32,
    pub intelligence: ReportedIntelligence,
    /// `<fraudCategory>/<persona>`.
    pub notes: String,
    pub agent_notes: String,
}

impl CompletionSummary {
    /// Builds the summary from the session as it stands.
    pub fn from_session(session: &Session) -> Self {
        let category = session
            .fraud_category()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let persona = session
            .persona()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "none".to_string());

        let agent_notes = format!(
            "Fraud type: {}. Persona: {}. Detection confidence: {:.2}. Intelligence score: {:.2}",
            category,
            persona,
            session.confidence(),
            session.intelligence_score()
        );

        Self {
            session_id: session.id().to_string(),
            fraud_detected: session.is_engaged(),
            total_messages: session.message_count(),
            intelligence: ReportedIntelligence::from(session.intelligence()),
            notes: format!("{}/{}", category, persona),
            agent_notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::detection::FraudCategory;
    use crate::domain::foundation::{SessionId, Timestamp};
    use crate::domain::intelligence::IntelligenceCategory;
    use crate::domain::persona::PersonaId;
    use crate::domain::session::Message;

    fn completed_session() -> Session {
        let mut session = Session::new(SessionId::new("sum-1").unwrap(), Timestamp::now());
        session.receive(Message::counterparty("pay to x@ybl", Timestamp::now()).unwrap());
        session.engage(0.91, FraudCategory::UpiFraud);
        session.assign_persona(PersonaId::BusyProfessional);
        session.merge_intelligence(
            &IntelligenceRecord::new()
                .with(IntelligenceCategory::UpiIds, "x@ybl")
                .with(IntelligenceCategory::PhoneNumbers, "9876543210"),
        );
        session
    }

    #[test]
    fn notes_name_category_and_persona() {
        let summary = CompletionSummary::from_session(&completed_session());
        assert_eq!(summary.notes, "upi_fraud/busy_professional");
        assert_eq!(
            summary.agent_notes,
            "Fraud type: upi_fraud. Persona: busy_professional. Detection confidence: 0.91. Intelligence score: 3.00"
        );
    }

    #[test]
    fn serializes_all_categories_as_camel_case_arrays() {
        let summary = CompletionSummary::from_session(&completed_session());
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["sessionId"], "sum-1");
        assert_eq!(json["fraudDetected"], true);
        assert_eq!(json["totalMessages"], 1);
        assert_eq!(json["intelligence"]["upiIds"][0], "x@ybl");
        assert_eq!(json["intelligence"]["phoneNumbers"][0], "9876543210");
        assert!(json["intelligence"]["bankAccounts"].as_array().unwrap().is_empty());
        assert!(json["intelligence"]["phishingLinks"].is_array());
        assert!(json["intelligence"]["suspiciousKeywords"].is_array());
    }

    #[test]
    fn counts_reported_items() {
        let summary = CompletionSummary::from_session(&completed_session());
        assert_eq!(summary.intelligence.total_items(), 2);
    }
}
