use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

/// Storage and display format for timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Get the last day of a given month.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(first_of_next - Duration::days(1))
}

/// Get the quarter (1-4) for a given date.
pub fn quarter_of(d: NaiveDate) -> u8 {
    ((d.month() - 1) / 3 + 1) as u8
}

/// Monday of ISO week `week` in `iso_year`.
///
/// Out-of-range weeks roll over instead of failing: week 0 is the last week
/// of the previous ISO year, week 54 lands in the next one.
pub fn iso_week_monday(iso_year: i32, week: i64) -> Option<NaiveDate> {
    // Jan 4th is always in ISO week 1.
    let jan4 = NaiveDate::from_ymd_opt(iso_year, 1, 4)?;
    let week1_monday = jan4 - Duration::days(jan4.weekday().num_days_from_monday() as i64);
    week1_monday.checked_add_signed(Duration::weeks(week - 1))
}

/// Elapsed hours between two timestamps at minute resolution
/// (days * 24 + hours + minutes / 60). Seconds are dropped.
pub fn hours_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let minutes = (to - from).num_minutes().abs();
    minutes as f64 / 60.0
}

/// Round to two decimal places, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Clamp a percentage-like value into `[0, 100]`.
pub fn clamp_pct(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp as stored, also accepting a bare `YYYY-MM-DD` (midnight)
/// and the `T` separator.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT) {
        return Ok(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Ok(ts);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| Error::InvalidInput(format!("invalid timestamp: {s}")))
}
