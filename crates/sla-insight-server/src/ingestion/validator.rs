//! Field validators applied to every raw ticket.
//!
//! Each validator is independent: it returns the cleaned value plus whether a
//! data-quality issue was detected. None of them fail the ingestion.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::config::SlaPolicy;
use crate::domain::Priority;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];

const TIME_FORMATS: [&str; 4] = ["%H:%M:%S%.f", "%H:%M", "%H%M%S%.f", "%H%M"];

/// Parse an ISO-8601 timestamp and return it in normalized form.
///
/// Accepts extended or basic dates, a `T` or space separator, times down to
/// hour precision with `.` or `,` fractions, and an optional `Z`/`±HH[:MM]`
/// offset. Empty or unparseable input yields `None`.
pub fn validate_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let (date_part, time_part) = match raw.find(&['T', ' '][..]) {
        Some(i) => (&raw[..i], Some(&raw[i + 1..])),
        None => (raw, None),
    };

    let date = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())?;

    let Some(time_part) = time_part else {
        return date.and_hms_opt(0, 0, 0).map(|ts| format_naive(&ts));
    };

    let (clock, offset) = split_offset(time_part)?;
    let ts = date.and_time(parse_time(clock)?);
    Some(match offset {
        Some(offset) => format!("{}{}", format_naive(&ts), offset),
        None => format_naive(&ts),
    })
}

fn split_offset(time: &str) -> Option<(&str, Option<FixedOffset>)> {
    if let Some(clock) = time.strip_suffix('Z') {
        return Some((clock, FixedOffset::east_opt(0)));
    }
    match time.find(&['+', '-'][..]) {
        Some(i) => Some((&time[..i], Some(parse_offset(&time[i..])?))),
        None => Some((time, None)),
    }
}

/// `±HH`, `±HHMM`, `±HH:MM`, optionally with seconds.
fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let sign = if raw.starts_with('-') { -1 } else { 1 };
    let digits: String = raw[1..].chars().filter(|&c| c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let (hours, minutes, seconds) = match digits.len() {
        2 => (&digits[..2], "0", "0"),
        4 => (&digits[..2], &digits[2..4], "0"),
        6 => (&digits[..2], &digits[2..4], &digits[4..]),
        _ => return None,
    };
    let minutes: i32 = minutes.parse().ok()?;
    let seconds: i32 = seconds.parse().ok()?;
    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    let total = hours.parse::<i32>().ok()? * 3600 + minutes * 60 + seconds;
    FixedOffset::east_opt(sign * total)
}

fn parse_time(clock: &str) -> Option<NaiveTime> {
    let mut clock = clock.replace(',', ".");
    // Hour-only; chrono needs a minute field.
    if clock.len() == 2 {
        clock.push_str("00");
    }
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&clock, fmt).ok())
}

fn format_naive(ts: &NaiveDateTime) -> String {
    let mut out = ts.format("%Y-%m-%dT%H:%M:%S").to_string();
    let micros = ts.nanosecond() / 1_000;
    if micros != 0 {
        out.push_str(&format!(".{micros:06}"));
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriorityCheck {
    /// Value to persist: canonical, repaired, or the raw value unchanged.
    pub stored: String,
    pub valid: bool,
}

pub fn validate_priority(raw: &str, policy: &SlaPolicy) -> PriorityCheck {
    if policy.is_valid_priority(raw) {
        return PriorityCheck {
            stored: raw.to_string(),
            valid: true,
        };
    }

    let stored = Priority::repair(raw)
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| raw.to_string());

    PriorityCheck {
        stored,
        valid: false,
    }
}

/// Empty or unparseable → `None`.
pub fn validate_float(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| !v.is_nan())
}
