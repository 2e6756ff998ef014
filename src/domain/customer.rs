use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::dates::de_flexible_day;

/// A studio customer as the backend returns it. Every field except `id` is
/// optional on the wire; missing or malformed values never fail the decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Birth date, accepted as a bare date or a timestamp.
    #[serde(default, deserialize_with = "de_flexible_day")]
    pub date_of_birth: Option<NaiveDate>,
    /// When the customer record was created upstream.
    #[serde(default, deserialize_with = "de_flexible_day")]
    pub created_at: Option<NaiveDate>,
}

impl Customer {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }

    /// Case-insensitive match against name, phone or email, for listing search.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        let hit = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|v| v.to_lowercase().contains(&query))
        };
        hit(&self.name) || hit(&self.phone_number) || hit(&self.email)
    }
}
