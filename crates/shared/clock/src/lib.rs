//! Kestrel Clock Infrastructure
//!
//! Time and identity sources behind the [`Clock`] and [`UuidFactory`] ports:
//!
//! - [`SystemClock`] reads wall-clock time and never runs backwards
//! - [`TestClock`] only moves when told to, for deterministic tests
//! - [`RandomUuidFactory`] generates v4 UUIDs
//!
//! ## Usage
//!
//! ```
//! use kestrel_clock::{Clock, TestClock};
//!
//! let clock = TestClock::new(1_000);
//! clock.advance(500);
//! assert_eq!(clock.timestamp_ns(), 1_500);
//! ```

mod random;
mod system;
mod test_clock;
mod time;

pub use random::RandomUuidFactory;
pub use system::SystemClock;
pub use test_clock::TestClock;
pub use time::{datetime_to_unix_nanos, unix_nanos_to_datetime};

// Re-export the ports for convenience
pub use kestrel_ports::{Clock, UuidFactory};
