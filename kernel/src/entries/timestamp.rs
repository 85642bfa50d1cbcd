// RFC 3339 timestamps with nanosecond precision.

use chrono::{DateTime, SecondsFormat, Utc};

/// Parse an RFC 3339 timestamp into a UTC instant.
///
/// Any offset is accepted and normalized to UTC; fractional seconds are
/// kept down to the nanosecond.
pub fn parse_rfc3339_nanos(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|parsed| parsed.with_timezone(&Utc))
}

/// Format an instant as RFC 3339 with nine fractional digits and a `Z` suffix.
pub fn format_rfc3339_nanos(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
