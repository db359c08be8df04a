//! Timestamp normalization
//!
//! Apple Health exports carry `2024-01-15 10:30:00 -0500` style dates, while
//! callers tend to pass ISO 8601 with or without an offset. Everything is
//! normalized to a [`Timestamp`]; anything unparseable becomes `None` and is
//! treated as "no time information" downstream.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, SecondsFormat, TimeZone};

/// Timezone-aware instant. Comparisons are by instant, the offset is kept
/// for display.
pub type Timestamp = DateTime<FixedOffset>;

/// Export canonical form: `YYYY-MM-DD HH:MM:SS ±HHMM`
const EXPORT_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a textual timestamp, returning `None` when no format matches.
///
/// Precedence:
/// 1. trailing `Z`/`z` (UTC)
/// 2. export canonical form
/// 3. ISO 8601 with an explicit offset
/// 4. naive date-time or date, assumed UTC
pub fn parse_timestamp(value: &str) -> Option<Timestamp> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(rest) = s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        return parse_naive_datetime(rest).and_then(assume_utc);
    }

    if let Ok(dt) = DateTime::parse_from_str(s, EXPORT_FORMAT) {
        return Some(dt);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    if let Some(naive) = parse_naive_datetime(s) {
        return assume_utc(naive);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(assume_utc)
}

/// Render an instant as ISO 8601 with seconds precision, keeping its offset
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn parse_naive_datetime(s: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

fn assume_utc(naive: NaiveDateTime) -> Option<Timestamp> {
    let utc = FixedOffset::east_opt(0)?;
    Some(utc.from_utc_datetime(&naive))
}

/// Conversion into a [`Timestamp`] for anything that may carry time information.
///
/// Strings go through [`parse_timestamp`]; zone-less values are assumed UTC.
pub trait IntoTimestamp {
    fn into_timestamp(self) -> Option<Timestamp>;
}

impl IntoTimestamp for &str {
    fn into_timestamp(self) -> Option<Timestamp> {
        parse_timestamp(self)
    }
}

impl IntoTimestamp for &String {
    fn into_timestamp(self) -> Option<Timestamp> {
        parse_timestamp(self)
    }
}

impl IntoTimestamp for String {
    fn into_timestamp(self) -> Option<Timestamp> {
        parse_timestamp(&self)
    }
}

impl<Tz: TimeZone> IntoTimestamp for DateTime<Tz> {
    fn into_timestamp(self) -> Option<Timestamp> {
        let offset = self.offset().fix();
        Some(self.with_timezone(&offset))
    }
}

impl IntoTimestamp for NaiveDateTime {
    fn into_timestamp(self) -> Option<Timestamp> {
        assume_utc(self)
    }
}

impl<T: IntoTimestamp> IntoTimestamp for Option<T> {
    fn into_timestamp(self) -> Option<Timestamp> {
        self.and_then(IntoTimestamp::into_timestamp)
    }
}
