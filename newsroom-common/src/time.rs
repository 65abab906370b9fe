//! Timestamp utilities

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// RFC 3339 with second precision and a `Z` suffix
///
/// All stored timestamps use this form so they order correctly as strings.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Calendar fields derived from a publication instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateParts {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM:SS`
    pub time: String,
    /// ISO week number
    pub week: u32,
    pub month: u32,
    pub year: i32,
}

impl DateParts {
    pub fn from_timestamp(ts: DateTime<Utc>) -> Self {
        Self {
            date: ts.format("%Y-%m-%d").to_string(),
            time: ts.format("%H:%M:%S").to_string(),
            week: ts.iso_week().week(),
            month: ts.month(),
            year: ts.year(),
        }
    }
}

/// Today's date as `YYYY-MM-DD` (UTC)
pub fn today() -> String {
    now().format("%Y-%m-%d").to_string()
}
