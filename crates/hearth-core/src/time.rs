//! Backend timestamps.
//!
//! The backend reports time as nanoseconds since the Unix epoch.

use chrono::{DateTime, Utc};

/// Nanoseconds since the Unix epoch, as sent by the backend.
pub type Time = i64;

/// Converts a backend timestamp to a UTC date-time.
pub fn to_datetime(time: Time) -> DateTime<Utc> {
    DateTime::from_timestamp_nanos(time)
}

/// The current time as a backend timestamp.
pub fn now() -> Time {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_datetime() {
        let dt = to_datetime(1_700_000_000_000_000_000);
        assert_eq!(dt.timestamp(), 1_700_000_000);
    }
}
