//! Seoul-anchored date/time normalization.
//!
//! Every date or date-time string that enters a handler is turned into a
//! [`TimePoint`] here. The result always carries the fixed `+09:00` offset:
//! zone-less input keeps its wall-clock numbers, input with any other zone is
//! converted to the equivalent Seoul wall clock.

use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc,
};
use std::fmt;
use thiserror::Error;

pub const SEOUL_OFFSET_SECS: i32 = 9 * 3600;
pub const SEOUL_TZ_LABEL: &str = "Asia/Seoul (KST, UTC+9)";

const DB_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

// chrono's %:z does not take a bare `Z`, so these are parsed as UTC by hand.
const UTC_MINUTE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

const ZONELESS_ISO_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid datetime format: '{input}' (expected 'YYYY-MM-DD HH:MM' or 'YYYY-MM-DD')")]
pub struct FormatError {
    pub input: String,
}

impl FormatError {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }
}

/// A civil date and time pinned to the Seoul offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimePoint(DateTime<FixedOffset>);

impl TimePoint {
    pub fn now() -> Self {
        Self(Utc::now().with_timezone(&seoul()))
    }

    /// Normalizes `input` into a Seoul time point.
    ///
    /// Tries, in order: an ISO date-time with or without zone, then
    /// `YYYY-MM-DD HH:MM`, then `YYYY-MM-DD` (midnight). Anything else,
    /// including two-digit years and out-of-range fields, is a
    /// [`FormatError`].
    pub fn parse(input: &str) -> Result<Self, FormatError> {
        let trimmed = input.trim();
        if !has_padded_fields(trimmed) {
            return Err(FormatError::new(input));
        }

        if let Some(point) = parse_structured(trimmed) {
            return Ok(point);
        }

        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M") {
            return Ok(Self::from_seoul_wall_clock(naive));
        }

        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Ok(Self::from_seoul_wall_clock(date.and_time(NaiveTime::MIN)));
        }

        Err(FormatError::new(input))
    }

    /// Attaches the Seoul offset to `naive` without shifting it.
    pub fn from_seoul_wall_clock(naive: NaiveDateTime) -> Self {
        let utc = naive - Duration::seconds(i64::from(SEOUL_OFFSET_SECS));
        Self(DateTime::<Utc>::from_naive_utc_and_offset(utc, Utc).with_timezone(&seoul()))
    }

    pub fn as_datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }

    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// ISO 8601 with the explicit offset, e.g. `2025-10-21T13:30:00+09:00`.
    pub fn to_iso(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    /// Seoul wall clock as stored in DATETIME columns.
    pub fn to_db_string(&self) -> String {
        self.0.format(DB_FORMAT).to_string()
    }

    pub fn date_string(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    pub fn weekday_name(&self) -> String {
        self.0.format("%A").to_string()
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso())
    }
}

pub fn seoul() -> FixedOffset {
    FixedOffset::east_opt(SEOUL_OFFSET_SECS).expect("seoul offset is within a day")
}

fn parse_structured(input: &str) -> Option<TimePoint> {
    if let Ok(zoned) = DateTime::parse_from_rfc3339(input) {
        return Some(TimePoint(zoned.with_timezone(&seoul())));
    }

    for format in ZONED_FORMATS {
        if let Ok(zoned) = DateTime::parse_from_str(input, format) {
            return Some(TimePoint(zoned.with_timezone(&seoul())));
        }
    }

    if let Some(utc) = input.strip_suffix(['Z', 'z']) {
        for format in UTC_MINUTE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(utc, format) {
                return Some(TimePoint(naive.and_utc().with_timezone(&seoul())));
            }
        }
    }

    for format in ZONELESS_ISO_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(TimePoint::from_seoul_wall_clock(naive));
        }
    }

    None
}

// chrono accepts short years and one-digit fields, so the widths of the
// date and time-of-day fields are checked by hand.
fn has_padded_fields(input: &str) -> bool {
    let bytes = input.as_bytes();
    if !matches_shape(bytes, b"dddd-dd-dd") {
        return false;
    }
    let time = &bytes[10..];
    if time.is_empty() {
        return true;
    }
    if !matches_shape(time, b"Tdd:dd") {
        return false;
    }
    let rest = &time[6..];
    !rest.starts_with(b":") || matches_shape(rest, b":dd")
}

/// `d` is any ASCII digit, `T` is the date/time separator.
fn matches_shape(bytes: &[u8], shape: &[u8]) -> bool {
    bytes.len() >= shape.len()
        && shape.iter().zip(bytes).all(|(want, got)| match want {
            b'd' => got.is_ascii_digit(),
            b'T' => matches!(got, b'T' | b't' | b' '),
            _ => want == got,
        })
}
