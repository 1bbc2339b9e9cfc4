//! Shared utility functions

use chrono::{DateTime, SecondsFormat, Utc};

/// Parse a stored RFC 3339 timestamp
///
/// A malformed value is a decode error, never a substitute time.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// Format a timestamp for storage
///
/// Always emits microseconds and a `Z` suffix so every stored value has the
/// same width and `ORDER BY` on the text column is chronological.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use quill_db::utils::format_timestamp;
///
/// let ts = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
/// assert_eq!(format_timestamp(&ts), "2024-01-01T12:00:00.000000Z");
/// ```
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_format_timestamp_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let fractional = whole + Duration::microseconds(1500);

        let a = format_timestamp(&whole);
        let b = format_timestamp(&fractional);

        assert_eq!(a.len(), b.len());
        assert!(a < b);
        assert_eq!(b, "2024-01-01T12:00:00.001500Z");
    }

    #[test]
    fn test_parse_timestamp() {
        let parsed = parse_timestamp("2024-01-01T12:00:00.000000Z").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T12:00:00+00:00");

        assert!(matches!(
            parse_timestamp("invalid"),
            Err(sqlx::Error::Decode(_))
        ));
    }

    #[test]
    fn test_round_trip_through_storage_format() {
        let now = Utc::now();
        let stored = format_timestamp(&now);
        let parsed = parse_timestamp(&stored).unwrap();
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
    }
}
