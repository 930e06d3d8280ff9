//! Unix time conversions

use chrono::{DateTime, Utc};

/// Convert a unix timestamp (seconds, fractional allowed) to a UTC datetime
///
/// Returns `None` for timestamps chrono cannot represent.
pub fn unix_to_datetime(unix: f64) -> Option<DateTime<Utc>> {
    if !unix.is_finite() {
        return None;
    }
    let secs = unix.floor();
    let nanos = ((unix - secs) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
}

/// Convert a UTC datetime to a unix timestamp in whole seconds
pub fn datetime_to_unix(datetime: DateTime<Utc>) -> i64 {
    datetime.timestamp()
}
