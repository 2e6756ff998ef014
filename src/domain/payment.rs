use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::dates::de_flexible_day;
use super::money::{Paise, de_lenient_amount};

/// Revenue classification for a payment's service field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
    Tattoo,
    Piercing,
    Other,
}

impl ServiceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Tattoo => "Tattoo",
            ServiceCategory::Piercing => "Piercing",
            ServiceCategory::Other => "Other",
        }
    }

    /// Classify a raw service label. Matching is case-insensitive; anything
    /// unrecognized (or absent) counts as `Other`.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(|l| l.trim().to_lowercase()).as_deref() {
            Some("tattoo") => ServiceCategory::Tattoo,
            Some("piercing") => ServiceCategory::Piercing,
            _ => ServiceCategory::Other,
        }
    }
}

impl std::fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One payment taken at the studio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "de_flexible_day")]
    pub payment_date: Option<NaiveDate>,
    /// Gross amount. Malformed values aggregate as zero.
    #[serde(default, deserialize_with = "de_lenient_amount")]
    pub amount: Option<Paise>,
    /// GST portion as populated upstream; summed directly, never re-derived.
    #[serde(default, deserialize_with = "de_lenient_amount")]
    pub gst: Option<Paise>,
    /// Payment method label (UPI, Cash, Card, ...).
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    /// Some endpoints spell the service field this way instead.
    #[serde(default)]
    pub service_type: Option<String>,
    /// Opaque reference for the invoice-download collaborator.
    #[serde(default)]
    pub invoice_ref: Option<String>,
}

impl Payment {
    pub fn amount_paise(&self) -> Paise {
        self.amount.unwrap_or(0)
    }

    pub fn gst_paise(&self) -> Paise {
        self.gst.unwrap_or(0)
    }

    /// The service label to classify on: `service` wins, `serviceType` is the
    /// fallback spelling.
    pub fn service_label(&self) -> Option<&str> {
        self.service.as_deref().or(self.service_type.as_deref())
    }

    pub fn category(&self) -> ServiceCategory {
        ServiceCategory::from_label(self.service_label())
    }

    /// Payment method for grouping, defaulting to "Other" when unset.
    pub fn method_label(&self) -> &str {
        self.payment_type
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or("Other")
    }
}
