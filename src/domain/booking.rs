use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::dates::de_flexible_day;
use super::money::{Paise, de_lenient_amount, ser_rupees};

/// An advance-payment booking. Created when a customer pays an advance,
/// marked fulfilled exactly once when they come in, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceBooking {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "de_flexible_day")]
    pub appointment_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de_lenient_amount")]
    pub advance_amount: Option<Paise>,
    #[serde(default, deserialize_with = "de_lenient_amount")]
    pub due_amount: Option<Paise>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub fulfilled: bool,
}

impl AdvanceBooking {
    pub fn advance_paise(&self) -> Paise {
        self.advance_amount.unwrap_or(0)
    }

    pub fn due_paise(&self) -> Paise {
        self.due_amount.unwrap_or(0)
    }
}

/// Payload for recording a new advance booking. Amounts go out as rupee
/// numbers, matching what the collection endpoint returns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub appointment_date: NaiveDate,
    #[serde(serialize_with = "ser_rupees")]
    pub advance_amount: Paise,
    #[serde(serialize_with = "ser_rupees")]
    pub due_amount: Paise,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    pub fulfilled: bool,
}

impl NewBooking {
    pub fn new(
        customer_name: impl Into<String>,
        appointment_date: NaiveDate,
        advance_amount: Paise,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            customer_id: None,
            appointment_date,
            advance_amount,
            due_amount: 0,
            service: None,
            fulfilled: false,
        }
    }

    pub fn with_customer_id(mut self, id: impl Into<String>) -> Self {
        self.customer_id = Some(id.into());
        self
    }

    pub fn with_due_amount(mut self, due: Paise) -> Self {
        self.due_amount = due;
        self
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_booking() {
        let booking: AdvanceBooking = serde_json::from_value(serde_json::json!({
            "id": "b1",
            "customerName": "Ravi",
            "appointmentDate": "2024-11-02",
            "advanceAmount": 500,
            "dueAmount": "1500",
            "service": "tattoo",
            "fulfilled": false
        }))
        .unwrap();

        assert_eq!(booking.advance_paise(), 50000);
        assert_eq!(booking.due_paise(), 150000);
        assert!(!booking.fulfilled);
    }

    #[test]
    fn test_new_booking_serializes_rupees() {
        let booking = NewBooking::new(
            "Ravi",
            NaiveDate::from_ymd_opt(2024, 11, 2).unwrap(),
            50000,
        )
        .with_due_amount(150000)
        .with_service("tattoo");

        let value = serde_json::to_value(&booking).unwrap();
        assert_eq!(value["advanceAmount"], serde_json::json!(500.0));
        assert_eq!(value["dueAmount"], serde_json::json!(1500.0));
        assert_eq!(value["customerName"], "Ravi");
        assert_eq!(value["fulfilled"], false);
        assert!(value.get("customerId").is_none());
    }
}
