//! Time conversion for wire timestamps
//!
//! OTLP JSON carries instants as nanoseconds since the Unix epoch in decimal
//! strings. Persisted instants are Unix milliseconds.

use chrono::{DateTime, Utc};

/// Truncate nanoseconds since the Unix epoch to milliseconds.
pub fn nanos_to_millis(nanos: u64) -> i64 {
    (nanos / 1_000_000) as i64
}

/// Convert persisted Unix milliseconds to a DateTime.
pub fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(|| {
        tracing::warn!(millis, "Invalid timestamp, using epoch");
        DateTime::UNIX_EPOCH
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_nanos_to_millis_truncates() {
        assert_eq!(nanos_to_millis(0), 0);
        assert_eq!(nanos_to_millis(999_999), 0);
        assert_eq!(nanos_to_millis(1_000_000), 1);
        assert_eq!(nanos_to_millis(1_999_999), 1);
    }

    #[test]
    fn test_nanos_to_millis_known_value() {
        // 2024-01-01 00:00:00 UTC = 1704067200 seconds
        let nanos = 1_704_067_200_u64 * 1_000_000_000;
        assert_eq!(nanos_to_millis(nanos), 1_704_067_200_000);
    }

    #[test]
    fn test_millis_to_datetime_epoch() {
        let dt = millis_to_datetime(0);
        assert_eq!(dt.year(), 1970);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 1);
    }

    #[test]
    fn test_millis_to_datetime_roundtrip() {
        let millis = 1_704_067_200_123_i64;
        let dt = millis_to_datetime(millis);
        assert_eq!(dt.timestamp_millis(), millis);
    }

    #[test]
    fn test_millis_to_datetime_out_of_range() {
        assert_eq!(millis_to_datetime(i64::MAX), DateTime::UNIX_EPOCH);
    }
}
