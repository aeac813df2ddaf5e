//! Time sources
//!
//! Expiry logic asks a [`Clock`] for the current instant instead of calling
//! `Instant::now()` directly, so tests can move time by hand.

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};
