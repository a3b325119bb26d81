//! Working-day calendar
//!
//! Weekends (Saturday and Sunday) are the only non-working days; there is no
//! holiday calendar. All dates are calendar dates without a time component.

use chrono::{Datelike, NaiveDate, Utc, Weekday};
use thiserror::Error;

/// Date format used everywhere (ISO 8601 calendar date)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq)]
pub enum CalendarError {
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Returns true if the date falls on Saturday or Sunday
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Counts business days from `start` to `end`, both inclusive.
///
/// A reversed range (`start > end`) counts as zero days.
pub fn working_days(start: NaiveDate, end: NaiveDate) -> u32 {
    if start > end {
        return 0;
    }

    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| !is_weekend(*day))
        .count() as u32
}

/// Today's calendar date in UTC
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parses a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| CalendarError::InvalidDate(s.to_string()))
}
