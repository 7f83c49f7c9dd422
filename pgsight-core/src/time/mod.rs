//! Time-window derivation for metrics reports.
//!
//! A window is described by a reference instant plus a signed duration
//! expression such as `2h` or `-45m`. A positive duration extends the window
//! forward from the reference, a negative one backward.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ReportError, ReportResult};

/// Reference-instant formats, tried in order. A bare date falls through to
/// a separate date parse and resolves to midnight.
const INSTANT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parses an ISO-8601 reference instant.
///
/// Accepts `T` or space as the date/time separator, optional fractional
/// seconds and a bare `YYYY-MM-DD` date, which resolves to midnight.
pub fn parse_instant(value: &str) -> Option<NaiveDateTime> {
    INSTANT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^((?P<weeks>[-+]?\d+)w|(?P<days>[-+]?\d+)d|(?P<hours>[-+]?\d+)h|(?P<minutes>[-+]?\d+)m)$",
    )
    .expect("duration regex compiles")
});

/// A resolved time window with `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Resolves a duration expression against a reference instant.
///
/// The expression is exactly one signed integer followed by one unit out of
/// `w`, `d`, `h`, `m`. Anything else fails with `InvalidDurationFormat` and
/// never yields a partial window.
pub fn resolve_window(reference: NaiveDateTime, duration: &str) -> ReportResult<TimeWindow> {
    let caps = DURATION_RE
        .captures(duration)
        .ok_or_else(|| invalid(duration))?;

    let (unit, raw) = ["weeks", "days", "hours", "minutes"]
        .into_iter()
        .find_map(|name| caps.name(name).map(|m| (name, m.as_str())))
        .ok_or_else(|| invalid(duration))?;

    let value: i64 = raw.parse().map_err(|_| invalid(duration))?;
    let magnitude = value.checked_abs().ok_or_else(|| invalid(duration))?;

    let delta = match unit {
        "weeks" => Duration::try_weeks(magnitude),
        "days" => Duration::try_days(magnitude),
        "hours" => Duration::try_hours(magnitude),
        _ => Duration::try_minutes(magnitude),
    }
    .ok_or_else(|| invalid(duration))?;

    if value > 0 {
        let end = reference
            .checked_add_signed(delta)
            .ok_or_else(|| invalid(duration))?;
        Ok(TimeWindow { start: reference, end })
    } else {
        let start = reference
            .checked_sub_signed(delta)
            .ok_or_else(|| invalid(duration))?;
        Ok(TimeWindow { start, end: reference })
    }
}

fn invalid(duration: &str) -> ReportError {
    ReportError::InvalidDurationFormat(format!(
        "'{duration}' (expected a signed integer followed by one of: w, d, h, m)"
    ))
}
