use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parse the calendar-day component of a date string.
///
/// The backend is inconsistent about date shapes: some fields are bare
/// `YYYY-MM-DD` strings, others full ISO timestamps. Comparisons in this
/// crate are all at day granularity, so we take the date component as
/// written and never run it through timezone conversion (which is where
/// off-by-one days come from).
pub fn day_from_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    // The leading date component covers both bare dates and timestamps.
    if let Some(prefix) = s.get(..10) {
        if let Ok(day) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(day);
        }
    }

    // Unpadded forms like "2024-1-5" are shorter than ten characters.
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Extract a calendar day from a raw JSON date field. Strings go through
/// [`day_from_str`]; numbers are taken as epoch milliseconds (UTC instants,
/// the one shape with no written calendar component). Anything else is
/// `None`.
pub fn day_from_value(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => day_from_str(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        _ => None,
    }
}

/// Serde adaptor for date fields: missing, null or malformed values all
/// deserialize to `None` instead of failing the whole collection.
pub fn de_flexible_day<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(day_from_value))
}

/// Shift a day back by exactly one calendar month. Days past the end of the
/// target month clamp to its last day (Mar 31 -> Feb 28/29).
pub fn shift_back_one_month(day: NaiveDate) -> NaiveDate {
    day.checked_sub_months(Months::new(1)).unwrap_or(day)
}

/// First day of the month containing `day`.
pub fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// Last day of the month containing `day`.
pub fn month_end(day: NaiveDate) -> NaiveDate {
    month_start(day)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(day)
}

/// The anniversary of `birth` falling in `year`. Feb 29 births clamp to
/// Feb 28 in non-leap years.
pub fn anniversary_in_year(birth: NaiveDate, year: i32) -> Option<NaiveDate> {
    birth
        .with_year(year)
        .or_else(|| birth.with_day(28).and_then(|d| d.with_year(year)))
}

/// Ordering for listings shown newest first. Records without a date sort
/// after all dated ones; sorts using this stay stable for equal keys.
pub fn cmp_recent_first(a: Option<NaiveDate>, b: Option<NaiveDate>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Ordering for listings shown soonest first, undated records last.
pub fn cmp_soonest_first(a: Option<NaiveDate>, b: Option<NaiveDate>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
