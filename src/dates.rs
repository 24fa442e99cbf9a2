//! Calendar-date arithmetic.
//!
//! All dates are `chrono::NaiveDate` values: they carry no time zone, so day
//! differences and additions cannot drift across DST transitions or the local
//! offset of whoever runs the tool. Every other module goes through these
//! helpers instead of subtracting dates itself.

use chrono::{Duration, NaiveDate};

use crate::errors::{PlanError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| PlanError::InvalidDate(s.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Whole days from `a` to `b`; positive when `b` is after `a`.
pub fn difference_in_days(a: NaiveDate, b: NaiveDate) -> i64 {
    b.signed_duration_since(a).num_days()
}

/// The date `days` days after `date` (`days` may be negative).
///
/// Saturates at the bounds of the supported calendar instead of panicking.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let Some(delta) = Duration::try_days(days) else {
        return if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX };
    };
    date.checked_add_signed(delta)
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Like [`add_days`], but fails instead of saturating at the calendar bounds.
pub fn try_add_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or_else(|| PlanError::InvalidDate(format!("{date} {days:+} days")))
}

/// Parse human-readable date input relative to `today`.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "in 3d", "in 2w"
/// - "YYYY-MM-DD" format
pub fn parse_date_input(s: &str, today: NaiveDate) -> Result<NaiveDate> {
    let lowered = s.trim().to_lowercase();

    match lowered.as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(add_days(today, 1)),
        "yesterday" => return Ok(add_days(today, -1)),
        _ => {}
    }

    if let Some(rest) = lowered.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return Ok(add_days(today, days));
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return Ok(add_days(today, weeks.saturating_mul(7)));
            }
        }
    }

    parse_date(&lowered)
}
