use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::dates::{cmp_recent_first, de_flexible_day};

/// Booleanize a health-flag field. The backend stores these as real booleans
/// in newer records and as "yes"/"no" strings in older ones.
fn de_yes_no<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => matches!(
            s.trim().to_lowercase().as_str(),
            "yes" | "y" | "true" | "1"
        ),
        _ => false,
    })
}

/// Health declarations shared by both consent form kinds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthFlags {
    #[serde(default, deserialize_with = "de_yes_no")]
    pub allergies: bool,
    #[serde(default, deserialize_with = "de_yes_no")]
    pub medications: bool,
    #[serde(default, deserialize_with = "de_yes_no")]
    pub medical_conditions: bool,
    #[serde(default, deserialize_with = "de_yes_no")]
    pub alcohol_drug_use: bool,
    #[serde(default, deserialize_with = "de_yes_no")]
    pub pregnancy_nursing: bool,
}

impl HealthFlags {
    pub fn any_flagged(&self) -> bool {
        self.allergies
            || self.medications
            || self.medical_conditions
            || self.alcohol_drug_use
            || self.pregnancy_nursing
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TattooConsent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "de_flexible_day")]
    pub created_at: Option<NaiveDate>,
    /// Body placement of the tattoo.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    /// Service date on the form, used when `createdAt` is absent.
    #[serde(default, deserialize_with = "de_flexible_day")]
    pub date: Option<NaiveDate>,
    #[serde(flatten)]
    pub health: HealthFlags,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PiercingConsent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "de_flexible_day")]
    pub created_at: Option<NaiveDate>,
    #[serde(default)]
    pub piercing_type: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "de_flexible_day")]
    pub date: Option<NaiveDate>,
    #[serde(flatten)]
    pub health: HealthFlags,
}

/// Which collection a merged form came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentKind {
    Tattoo,
    Piercing,
}

impl ConsentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentKind::Tattoo => "tattoo",
            ConsentKind::Piercing => "piercing",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "tattoo" => Some(ConsentKind::Tattoo),
            "piercing" => Some(ConsentKind::Piercing),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConsentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A consent form of either kind, tagged with its origin when the two
/// collections are merged.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConsentForm {
    Tattoo(TattooConsent),
    Piercing(PiercingConsent),
}

impl ConsentForm {
    pub fn kind(&self) -> ConsentKind {
        match self {
            ConsentForm::Tattoo(_) => ConsentKind::Tattoo,
            ConsentForm::Piercing(_) => ConsentKind::Piercing,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ConsentForm::Tattoo(form) => &form.id,
            ConsentForm::Piercing(form) => &form.id,
        }
    }

    pub fn customer_name(&self) -> Option<&str> {
        match self {
            ConsentForm::Tattoo(form) => form.customer_name.as_deref(),
            ConsentForm::Piercing(form) => form.customer_name.as_deref(),
        }
    }

    pub fn artist(&self) -> Option<&str> {
        match self {
            ConsentForm::Tattoo(form) => form.artist.as_deref(),
            ConsentForm::Piercing(form) => form.artist.as_deref(),
        }
    }

    /// What was done, at the granularity the form records it.
    pub fn detail(&self) -> String {
        match self {
            ConsentForm::Tattoo(form) => form
                .location
                .clone()
                .unwrap_or_else(|| "tattoo".to_string()),
            ConsentForm::Piercing(form) => match (&form.piercing_type, &form.subtype) {
                (Some(kind), Some(sub)) => format!("{kind} / {sub}"),
                (Some(kind), None) => kind.clone(),
                (None, Some(sub)) => sub.clone(),
                (None, None) => "piercing".to_string(),
            },
        }
    }

    pub fn health(&self) -> &HealthFlags {
        match self {
            ConsentForm::Tattoo(form) => &form.health,
            ConsentForm::Piercing(form) => &form.health,
        }
    }

    /// The date that places this form on the timeline: creation timestamp
    /// first, the form's service date only when that is absent.
    pub fn effective_date(&self) -> Option<NaiveDate> {
        match self {
            ConsentForm::Tattoo(form) => form.created_at.or(form.date),
            ConsentForm::Piercing(form) => form.created_at.or(form.date),
        }
    }
}

/// Merge the two consent collections into one sequence sorted newest first.
/// The sort is stable: forms with equal effective dates keep their relative
/// input order (tattoo forms before piercing forms, as concatenated), and
/// forms with no usable date sink to the end in input order.
pub fn merge_consent_forms(
    tattoo: Vec<TattooConsent>,
    piercing: Vec<PiercingConsent>,
) -> Vec<ConsentForm> {
    let mut merged: Vec<ConsentForm> = tattoo
        .into_iter()
        .map(ConsentForm::Tattoo)
        .chain(piercing.into_iter().map(ConsentForm::Piercing))
        .collect();

    merged.sort_by(|a, b| cmp_recent_first(a.effective_date(), b.effective_date()));
    merged
}
