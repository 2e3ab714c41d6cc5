//! Reporting period derivation.
//!
//! The dashboard always reports on the calendar month containing a reference
//! instant, inclusive of both boundary instants: the first second of day 1
//! through 23:59:59 of the last day. Month lengths follow the calendar
//! (28-31 days, leap years included) via chrono.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

/// An inclusive time window over one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportingPeriod {
    /// The calendar month containing `reference`, in UTC.
    pub fn month_containing(reference: DateTime<Utc>) -> Self {
        let year = reference.year();
        let month = reference.month();

        // Day 1 at midnight is always a valid, unambiguous UTC instant.
        let start = Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap();

        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let next_month_start = Utc
            .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
            .unwrap();

        // Inclusive end: 23:59:59 on the last day of the month.
        let end = next_month_start - Duration::seconds(1);

        Self { start, end }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}
