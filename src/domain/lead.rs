use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::dates::de_flexible_day;

/// Pipeline stage of an enquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
    Converted,
    Lost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Converted => "converted",
            LeadStatus::Lost => "lost",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "new" => Some(LeadStatus::New),
            "contacted" => Some(LeadStatus::Contacted),
            "converted" => Some(LeadStatus::Converted),
            "lost" => Some(LeadStatus::Lost),
            _ => None,
        }
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An enquiry that has not become a customer yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Where the enquiry came from (walk-in, Instagram, referral, ...).
    #[serde(default)]
    pub source: Option<String>,
    /// Raw status string; the backend is not strict about casing.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "de_flexible_day")]
    pub created_at: Option<NaiveDate>,
}

impl Lead {
    /// Parsed pipeline stage, treating unknown or missing values as new.
    pub fn stage(&self) -> LeadStatus {
        self.status
            .as_deref()
            .and_then(LeadStatus::from_str)
            .unwrap_or(LeadStatus::New)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_parses_loose_casing() {
        let lead: Lead = serde_json::from_value(serde_json::json!({
            "id": "l1",
            "name": "Meera",
            "status": "Converted"
        }))
        .unwrap();
        assert_eq!(lead.stage(), LeadStatus::Converted);
    }

    #[test]
    fn test_stage_defaults_to_new() {
        let lead: Lead = serde_json::from_value(serde_json::json!({
            "id": "l2",
            "status": "???"
        }))
        .unwrap();
        assert_eq!(lead.stage(), LeadStatus::New);
    }
}
