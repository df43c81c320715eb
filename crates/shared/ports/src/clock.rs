use chrono::{DateTime, Utc};
use kestrel_core::UnixNanos;

/// Port for time abstraction
///
/// This allows the order model to use different time sources:
/// - Real system time for live use
/// - Manually driven time for deterministic tests and backtests
pub trait Clock: Send + Sync {
    /// Get the current time according to this clock
    fn now(&self) -> DateTime<Utc>;

    /// Current time in nanoseconds since the UNIX epoch
    ///
    /// Times before the epoch clamp to zero.
    fn timestamp_ns(&self) -> UnixNanos {
        self.now()
            .timestamp_nanos_opt()
            .and_then(|ns| UnixNanos::try_from(ns).ok())
            .unwrap_or(0)
    }

    /// Get the clock's name/identifier for debugging
    fn name(&self) -> &str {
        "Clock"
    }
}
