//! Domain entities

mod contact;
mod presence;
mod typing;

pub use contact::{Actor, Contact, ContactChanges, MutationNotice};
pub use presence::{EditingRef, PresenceEntry, PresenceStatus, Roster};
pub use typing::{TypingEntry, TypingKey};
