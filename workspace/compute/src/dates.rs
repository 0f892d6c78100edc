//! Calendar helpers for reminder evaluation.
//!
//! Stored dates are free-form ISO strings. Only the calendar date matters:
//! a timestamp such as `2024-03-12T18:30:00Z` counts as `2024-03-12`.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::error::{ComputeError, Result};

/// Parses an ISO-8601 date or date-time string into its calendar date.
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate> {
    let value = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.naive_local().date());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(timestamp.date());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M") {
        return Ok(timestamp.date());
    }

    Err(ComputeError::Date(format!("unrecognised date '{}'", raw)))
}

/// Whole days from `today` until `date`; negative for past dates.
pub fn days_until(today: NaiveDate, date: NaiveDate) -> i64 {
    date.signed_duration_since(today).num_days()
}

/// The same month and day moved to `year`.
///
/// February 29th lands on February 28th in common years.
pub fn anniversary_in(date: NaiveDate, year: i32) -> Option<NaiveDate> {
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28))
}

/// Next occurrence of a yearly date on or after `today`.
///
/// The current year's anniversary is used unless it already passed, in which
/// case the following year's is returned. Never rolls more than one year.
pub fn next_occurrence(date: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let candidate = anniversary_in(date, today.year())?;
    if candidate < today {
        anniversary_in(date, today.year() + 1)
    } else {
        Some(candidate)
    }
}

/// Formats a date the way reminders spell it, e.g. `March 12th`.
pub fn format_month_day(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{} {}{}", date.format("%B"), day, suffix)
}
