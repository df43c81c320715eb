use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use kestrel_core::UnixNanos;
use kestrel_ports::Clock;

use crate::time::{datetime_to_unix_nanos, unix_nanos_to_datetime};

/// Wall-clock time that never runs backwards
///
/// If the host clock steps back (NTP correction), readings hold at the latest
/// time already handed out, so event timestamps stay ordered.
#[derive(Debug, Default)]
pub struct SystemClock {
    latest_ns: AtomicU64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_ns(&self) -> UnixNanos {
        let wall = datetime_to_unix_nanos(&Utc::now()).unwrap_or(0);
        let prior = self.latest_ns.fetch_max(wall, Ordering::AcqRel);
        prior.max(wall)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        unix_nanos_to_datetime(self.read_ns())
    }

    fn timestamp_ns(&self) -> UnixNanos {
        self.read_ns()
    }

    fn name(&self) -> &str {
        "SystemClock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readings_track_wall_time() {
        let clock = SystemClock::new();
        let before = datetime_to_unix_nanos(&Utc::now()).unwrap();
        let reading = clock.timestamp_ns();
        let after = datetime_to_unix_nanos(&Utc::now()).unwrap();
        assert!(before <= reading && reading <= after);
    }

    #[test]
    fn test_holds_when_wall_clock_steps_back() {
        let clock = SystemClock::new();
        let ahead = datetime_to_unix_nanos(&Utc::now()).unwrap() + 3_600_000_000_000;
        clock.latest_ns.store(ahead, Ordering::Release);

        assert_eq!(clock.timestamp_ns(), ahead);
        assert_eq!(datetime_to_unix_nanos(&clock.now()), Some(ahead));
    }

    #[test]
    fn test_readings_never_decrease() {
        let clock = SystemClock::new();
        let mut last = clock.timestamp_ns();
        for _ in 0..1_000 {
            let next = clock.timestamp_ns();
            assert!(next >= last);
            last = next;
        }
    }
}
