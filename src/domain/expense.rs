use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::dates::de_flexible_day;
use super::money::{Paise, de_lenient_amount};

/// One studio expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "de_flexible_day")]
    pub expense_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de_lenient_amount")]
    pub amount: Option<Paise>,
    /// What the money went on (ink, rent, sterilization supplies, ...).
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl Expense {
    pub fn amount_paise(&self) -> Paise {
        self.amount.unwrap_or(0)
    }

    /// Grouping label for expense breakdowns, defaulting to "Other".
    pub fn purpose_label(&self) -> &str {
        self.purpose
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or("Other")
    }
}
