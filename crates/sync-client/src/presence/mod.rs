//! Presence tracking

mod store;

pub use store::PresenceStore;
