//! Kestrel Ports
//!
//! Port definitions (traits) for the Kestrel trading model.
//! These define the boundaries between domain logic and the sources of time
//! and identity it depends on.

mod clock;
mod identity;

pub use clock::Clock;
pub use identity::UuidFactory;
