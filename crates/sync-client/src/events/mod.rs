//! Application-facing events
//!
//! Parsed inbound frames are re-published through an `EventBroadcaster`.

mod broadcaster;
mod types;

pub use broadcaster::{EventBroadcaster, ListenerId};
pub use types::{EventKind, SyncEvent};
