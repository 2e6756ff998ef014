use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Money is represented as integer paise to avoid floating-point precision issues.
/// 1 rupee = 100 paise, so ₹1500.00 = 150000 paise.
pub type Paise = i64;

/// Format paise as a human-readable amount string.
/// Example: 150000 -> "1500.00", -1234 -> "-12.34"
pub fn format_amount(paise: Paise) -> String {
    let sign = if paise < 0 { "-" } else { "" };
    let abs = paise.abs();
    let rupees = abs / 100;
    let remainder = abs % 100;
    format!("{}{}.{:02}", sign, rupees, remainder)
}

/// Parse a decimal string into paise. Used for CLI input, where bad input
/// should be reported rather than swallowed.
/// Example: "1500.00" -> 150000, "12.5" -> 1250, "100" -> 10000
pub fn parse_amount(input: &str) -> Result<Paise, ParseAmountError> {
    let input = input.trim();
    let negative = input.starts_with('-');
    let input = input.trim_start_matches('-');

    let parts: Vec<&str> = input.split('.').collect();
    match parts.len() {
        1 => {
            // No decimal point, treat as whole rupees
            let rupees: i64 = parts[0]
                .parse()
                .map_err(|_| ParseAmountError::InvalidFormat)?;
            let paise = rupees * 100;
            Ok(if negative { -paise } else { paise })
        }
        2 => {
            let rupees: i64 = if parts[0].is_empty() {
                0
            } else {
                parts[0]
                    .parse()
                    .map_err(|_| ParseAmountError::InvalidFormat)?
            };

            // Handle decimal part - pad or truncate to 2 digits
            let decimal_str = parts[1];
            let decimal_paise: i64 = match decimal_str.len() {
                0 => 0,
                1 => {
                    // Single digit like "5" means 50 paise
                    decimal_str
                        .parse::<i64>()
                        .map_err(|_| ParseAmountError::InvalidFormat)?
                        * 10
                }
                2 => decimal_str
                    .parse()
                    .map_err(|_| ParseAmountError::InvalidFormat)?,
                _ => {
                    // More than 2 decimal places - truncate
                    decimal_str[..2]
                        .parse()
                        .map_err(|_| ParseAmountError::InvalidFormat)?
                }
            };

            let paise = rupees * 100 + decimal_paise;
            Ok(if negative { -paise } else { paise })
        }
        _ => Err(ParseAmountError::InvalidFormat),
    }
}

/// Convert a raw JSON value into paise, tolerating the shapes the backend
/// actually emits: a number of rupees (possibly fractional) or a numeric
/// string. Anything else is `None`, which aggregations count as zero.
pub fn amount_from_value(value: &Value) -> Option<Paise> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
    .map(|rupees| (rupees * 100.0).round() as Paise)
}

/// Serde adaptor for amount fields: missing, null or malformed values all
/// deserialize to `None` instead of failing the whole collection.
pub fn de_lenient_amount<'de, D>(deserializer: D) -> Result<Option<Paise>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(amount_from_value))
}

/// Serialize paise as the rupee number the backend stores.
pub fn ser_rupees<S>(paise: &Paise, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(*paise as f64 / 100.0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    InvalidFormat,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::InvalidFormat => write!(f, "invalid amount format"),
        }
    }
}

impl std::error::Error for ParseAmountError {}
