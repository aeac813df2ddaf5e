//! # sync-core
//!
//! Domain layer for workspace synchronization: presence entries, typing entries,
//! contact mutation notices and the clock abstraction used for expiry.
//! This crate has zero dependencies on I/O (sockets, runtimes, etc.).

pub mod entities;
pub mod time;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Actor, Contact, ContactChanges, EditingRef, MutationNotice, PresenceEntry, PresenceStatus,
    Roster, TypingEntry, TypingKey,
};
pub use time::{Clock, ManualClock, SystemClock};
pub use value_objects::timestamp;
