use chrono::{DateTime, TimeZone, Utc};

/// Current UTC timestamp (Unix millis)
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert stored Unix millis into a UTC instant.
///
/// Out-of-range values yield `None` instead of panicking.
pub fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Convert a UTC instant into Unix millis for storage
pub fn datetime_to_millis(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_roundtrip() {
        let millis = 1_767_225_600_000; // 2026-01-01T00:00:00Z
        let dt = millis_to_datetime(millis).unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-01-01T00:00:00+00:00");
        assert_eq!(datetime_to_millis(dt), millis);
    }

    #[test]
    fn test_millis_out_of_range() {
        assert!(millis_to_datetime(i64::MAX).is_none());
    }
}
