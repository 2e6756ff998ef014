use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::customer::Customer;
use super::dates::anniversary_in_year;

pub const DEFAULT_LOOKAHEAD_DAYS: i64 = 15;

/// A customer whose birthday falls inside the lookahead window.
#[derive(Debug, Clone, Serialize)]
pub struct BirthdayCandidate {
    pub customer: Customer,
    pub upcoming_anniversary: NaiveDate,
    pub days_until: i64,
}

/// Customers with a birthday in the next `lookahead_days` days, soonest
/// first.
///
/// Anniversaries are materialized as concrete dates in this year and the
/// next, so a late-December query still sees early-January birthdays.
/// Feb 29 births fall on Feb 28 in non-leap years. Customers without a
/// parsable birth date are skipped.
pub fn upcoming_birthdays(
    customers: &[Customer],
    today: NaiveDate,
    lookahead_days: i64,
) -> Vec<BirthdayCandidate> {
    let mut upcoming: Vec<BirthdayCandidate> = customers
        .iter()
        .filter_map(|customer| {
            let birth = customer.date_of_birth?;
            let (anniversary, days_until) = [
                anniversary_in_year(birth, today.year()),
                anniversary_in_year(birth, today.year() + 1),
            ]
            .into_iter()
            .flatten()
            .map(|date| (date, (date - today).num_days()))
            .filter(|(_, days)| *days >= 0)
            .min_by_key(|(_, days)| *days)?;

            if days_until > lookahead_days {
                return None;
            }
            Some(BirthdayCandidate {
                customer: customer.clone(),
                upcoming_anniversary: anniversary,
                days_until,
            })
        })
        .collect();

    upcoming.sort_by_key(|candidate| candidate.days_until);
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn customer(id: &str, born: Option<&str>) -> Customer {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": id,
            "dateOfBirth": born,
        }))
        .unwrap()
    }

    #[test]
    fn test_upcoming_within_window() {
        let customers = vec![customer("c1", Some("1999-11-01"))];
        let upcoming = upcoming_birthdays(&customers, day("2024-10-25"), DEFAULT_LOOKAHEAD_DAYS);

        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].days_until, 7);
        assert_eq!(upcoming[0].upcoming_anniversary, day("2024-11-01"));
    }

    #[test]
    fn test_wraps_across_year_boundary() {
        let customers = vec![customer("c1", Some("1990-01-03"))];
        let upcoming = upcoming_birthdays(&customers, day("2024-12-29"), DEFAULT_LOOKAHEAD_DAYS);

        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].days_until, 5);
        assert_eq!(upcoming[0].upcoming_anniversary, day("2025-01-03"));
    }

    #[test]
    fn test_birthday_today_counts_as_zero() {
        let customers = vec![customer("c1", Some("2000-10-25"))];
        let upcoming = upcoming_birthdays(&customers, day("2024-10-25"), DEFAULT_LOOKAHEAD_DAYS);

        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].days_until, 0);
    }

    #[test]
    fn test_outside_window_excluded() {
        // Birthday passed three days ago; next one is ~a year out.
        let customers = vec![customer("c1", Some("1995-10-22"))];
        let upcoming = upcoming_birthdays(&customers, day("2024-10-25"), DEFAULT_LOOKAHEAD_DAYS);
        assert!(upcoming.is_empty());
    }

    #[test]
    fn test_unparsable_birth_dates_skipped() {
        let customers = vec![
            customer("c1", None),
            customer("c2", Some("not a date")),
            customer("c3", Some("1999-11-01")),
        ];
        let upcoming = upcoming_birthdays(&customers, day("2024-10-25"), DEFAULT_LOOKAHEAD_DAYS);

        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].customer.id, "c3");
    }

    #[test]
    fn test_sorted_soonest_first() {
        let customers = vec![
            customer("far", Some("1988-11-05")),
            customer("near", Some("1992-10-28")),
        ];
        let upcoming = upcoming_birthdays(&customers, day("2024-10-25"), DEFAULT_LOOKAHEAD_DAYS);

        assert_eq!(upcoming.len(), 2);
        assert_eq!(upcoming[0].customer.id, "near");
        assert_eq!(upcoming[1].customer.id, "far");
    }

    #[test]
    fn test_leap_day_clamps_in_common_years() {
        let customers = vec![customer("c1", Some("2000-02-29"))];
        let upcoming = upcoming_birthdays(&customers, day("2025-02-20"), DEFAULT_LOOKAHEAD_DAYS);

        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].upcoming_anniversary, day("2025-02-28"));
        assert_eq!(upcoming[0].days_until, 8);
    }
}
