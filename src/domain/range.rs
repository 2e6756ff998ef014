use std::fmt;

use chrono::{Days, Months, NaiveDate};
use serde::Serialize;

use super::dates::{month_end, month_start, shift_back_one_month};

/// Ranges longer than this many days chart by calendar month; anything
/// shorter uses two-day buckets.
pub const MONTH_BUCKET_THRESHOLD_DAYS: i64 = 32;

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Month,
    TwoDay,
}

/// One unit of a trend series: a slice of the selected range plus the same
/// slice shifted back one calendar month for comparison.
#[derive(Debug, Clone)]
pub struct Bucket {
    pub label: String,
    pub current: DateRange,
    pub previous: DateRange,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidDateRange> {
        if start > end {
            return Err(InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// Whole calendar month containing `day`.
    pub fn month_of(day: NaiveDate) -> Self {
        Self {
            start: month_start(day),
            end: month_end(day),
        }
    }

    /// First of the month through `today`, the default dashboard range.
    pub fn month_to_date(today: NaiveDate) -> Self {
        Self {
            start: month_start(today),
            end: today,
        }
    }

    /// Both boundary days are inside the range.
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Range test for a record's effective date: a record with no parsable
    /// date is excluded, never included by default.
    pub fn contains_opt(&self, day: Option<NaiveDate>) -> bool {
        day.is_some_and(|day| self.contains(day))
    }

    /// Inclusive span in days; a single-day range spans 1.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The same range one calendar month earlier, month-end days clamped.
    pub fn shifted_back_one_month(&self) -> Self {
        Self {
            start: shift_back_one_month(self.start),
            end: shift_back_one_month(self.end),
        }
    }

    pub fn granularity(&self) -> Granularity {
        if self.days() > MONTH_BUCKET_THRESHOLD_DAYS {
            Granularity::Month
        } else {
            Granularity::TwoDay
        }
    }

    /// Split the range into chart buckets per its granularity. Month buckets
    /// are clipped to the range; two-day buckets start at `start` and the
    /// last one is clipped to `end`.
    pub fn buckets(&self) -> Vec<Bucket> {
        match self.granularity() {
            Granularity::Month => self.month_buckets(),
            Granularity::TwoDay => self.stride_buckets(),
        }
    }

    fn month_buckets(&self) -> Vec<Bucket> {
        let mut buckets = Vec::new();
        let mut cursor = month_start(self.start);
        while cursor <= self.end {
            let current = DateRange {
                start: cursor.max(self.start),
                end: month_end(cursor).min(self.end),
            };
            buckets.push(Bucket {
                label: current.start.format("%b %Y").to_string(),
                previous: current.shifted_back_one_month(),
                current,
            });
            cursor = match cursor.checked_add_months(Months::new(1)) {
                Some(next) => next,
                None => break,
            };
        }
        buckets
    }

    fn stride_buckets(&self) -> Vec<Bucket> {
        let mut buckets = Vec::new();
        let mut cursor = self.start;
        while cursor <= self.end {
            let stride_end = cursor
                .checked_add_days(Days::new(1))
                .unwrap_or(self.end)
                .min(self.end);
            let current = DateRange {
                start: cursor,
                end: stride_end,
            };
            buckets.push(Bucket {
                label: cursor.format("%d %b").to_string(),
                previous: current.shifted_back_one_month(),
                current,
            });
            cursor = match cursor.checked_add_days(Days::new(2)) {
                Some(next) => next,
                None => break,
            };
        }
        buckets
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for InvalidDateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "range start {} is after end {}", self.start, self.end)
    }
}

impl std::error::Error for InvalidDateRange {}
