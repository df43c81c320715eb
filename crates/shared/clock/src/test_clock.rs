use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use kestrel_core::UnixNanos;
use kestrel_ports::Clock;

use crate::time::unix_nanos_to_datetime;

/// Manually driven clock
///
/// Time only moves through [`TestClock::set`] and [`TestClock::advance`],
/// which makes timestamps and the identifiers derived from them reproducible.
#[derive(Debug, Default)]
pub struct TestClock {
    ns: AtomicU64,
}

impl TestClock {
    pub fn new(start_ns: UnixNanos) -> Self {
        Self {
            ns: AtomicU64::new(start_ns),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, ns: UnixNanos) {
        self.ns.store(ns, Ordering::SeqCst);
    }

    /// Move forward by `delta_ns`, saturating at the maximum
    pub fn advance(&self, delta_ns: u64) {
        let _ = self
            .ns
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |ns| {
                Some(ns.saturating_add(delta_ns))
            });
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        unix_nanos_to_datetime(self.timestamp_ns())
    }

    fn timestamp_ns(&self) -> UnixNanos {
        self.ns.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "TestClock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_frozen_until_moved() {
        let clock = TestClock::new(42);
        assert_eq!(clock.timestamp_ns(), 42);
        assert_eq!(clock.timestamp_ns(), 42);

        clock.advance(8);
        assert_eq!(clock.timestamp_ns(), 50);

        clock.set(1_000_000_000);
        assert_eq!(clock.now().timestamp(), 1);
    }

    #[test]
    fn test_advance_saturates() {
        let clock = TestClock::new(u64::MAX - 1);
        clock.advance(10);
        assert_eq!(clock.timestamp_ns(), u64::MAX);
    }
}
