//! Time and timestamp helpers.

use chrono::{DateTime, SecondsFormat, Utc};

/// UTC timestamp used for `observed_at`, `created_at` and query bounds.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Parse an RFC 3339 timestamp and normalise it to UTC.
///
/// # Errors
///
/// Returns the [`chrono::ParseError`] when `input` is not RFC 3339.
pub fn parse_rfc3339(input: &str) -> Result<Timestamp, chrono::ParseError> {
    DateTime::parse_from_rfc3339(input).map(|ts| ts.with_timezone(&Utc))
}

/// Fixed-width RFC 3339 rendering (microseconds, `Z` suffix).
///
/// Two renderings compare lexically in the same order as the instants they
/// represent, which lets text columns be sorted directly.
#[must_use]
pub fn to_sortable_string(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
