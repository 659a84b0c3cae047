//! Calendar-day helpers shared by detection and billing
//!
//! Everything here works on `NaiveDate`: stored timestamps are truncated to
//! their calendar day before any comparison.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

/// Read a calendar day from an ISO day or a timestamp.
///
/// Accepts `YYYY-MM-DD`, any value whose first ten characters form a valid
/// ISO day (e.g. `2026-02-01T00:00:00.000Z`), RFC 3339 and
/// `YYYY-MM-DD HH:MM:SS`.
pub fn parse_calendar_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(prefix) = value.get(..10) {
        if looks_like_iso_date(prefix) {
            if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
                return Some(date);
            }
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.date())
        .ok()
}

/// Parse a due date, failing when it is missing or unreadable
pub fn parse_due_date(value: Option<&str>) -> Result<NaiveDate> {
    let raw = value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidDate("due date is missing".to_string()))?;

    parse_calendar_day(raw).ok_or_else(|| Error::InvalidDate(format!("cannot parse '{}'", raw)))
}

/// Format a day as `YYYY-MM-DD`
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Number of days in the given month (1-12)
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|d| d.day())
}

/// Add whole months, clamping the day to the end of a shorter target month.
///
/// `2026-01-31 + 1 month = 2026-02-28`. Returns `None` only when the result
/// falls outside chrono's supported range.
pub fn add_months_clamped(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let month_index = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(months);
    let year = i32::try_from(month_index.div_euclid(12)).ok()?;
    let month = u32::try_from(month_index.rem_euclid(12)).ok()? + 1;

    let first_of_target = NaiveDate::from_ymd_opt(year, month, 1)?;
    let day = date.day().min(days_in_month(year, month)?);
    first_of_target.with_day(day)
}

/// Add whole years, clamping Feb 29 to Feb 28 in non-leap years
pub fn add_years_clamped(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    add_months_clamped(date, years.checked_mul(12)?)
}

/// Whole days from `today` until `due` (negative when overdue)
pub fn days_until(due: NaiveDate, today: NaiveDate) -> i64 {
    (due - today).num_days()
}

fn looks_like_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    [0usize, 1, 2, 3, 5, 6, 8, 9]
        .iter()
        .all(|&i| bytes[i].is_ascii_digit())
}
