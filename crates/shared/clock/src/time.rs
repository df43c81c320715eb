use chrono::{DateTime, Utc};
use kestrel_core::UnixNanos;

/// Convert nanoseconds since the UNIX epoch into a UTC datetime
pub fn unix_nanos_to_datetime(ns: UnixNanos) -> DateTime<Utc> {
    // u64 nanos past i64::MAX fall beyond chrono's range
    let ns = i64::try_from(ns).unwrap_or(i64::MAX);
    DateTime::from_timestamp_nanos(ns)
}

/// Convert a UTC datetime into nanoseconds since the UNIX epoch
///
/// Returns `None` for times before the epoch or outside the i64 nanosecond range.
pub fn datetime_to_unix_nanos(dt: &DateTime<Utc>) -> Option<UnixNanos> {
    dt.timestamp_nanos_opt()
        .and_then(|ns| UnixNanos::try_from(ns).ok())
}
