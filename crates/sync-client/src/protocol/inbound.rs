//! Server-to-client frames

use super::MessageType;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sync_core::{timestamp, Actor, Contact, ContactChanges, MutationNotice, PresenceEntry, Roster};

/// A decoded server frame
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    Connected(ConnectedEvent),
    PresenceUpdate(PresenceUpdateEvent),
    ContactCreated(ContactCreatedEvent),
    ContactUpdated(ContactUpdatedEvent),
    ContactDeleted(ContactDeletedEvent),
    NoteAdded(NoteAddedEvent),
    Typing(TypingEvent),
    CursorPosition(CursorPositionEvent),
    Error(ErrorEvent),
    Pong,
}

impl InboundMessage {
    /// The frame type this message was decoded from
    #[must_use]
    pub const fn kind(&self) -> MessageType {
        match self {
            Self::Connected(_) => MessageType::Connected,
            Self::PresenceUpdate(_) => MessageType::PresenceUpdate,
            Self::ContactCreated(_) => MessageType::ContactCreated,
            Self::ContactUpdated(_) => MessageType::ContactUpdated,
            Self::ContactDeleted(_) => MessageType::ContactDeleted,
            Self::NoteAdded(_) => MessageType::NoteAdded,
            Self::Typing(_) => MessageType::Typing,
            Self::CursorPosition(_) => MessageType::CursorPosition,
            Self::Error(_) => MessageType::Error,
            Self::Pong => MessageType::Pong,
        }
    }
}

/// Fields the server may add to any frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl Envelope {
    /// Parsed server timestamp, if present and well formed
    #[must_use]
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_deref().and_then(timestamp::parse)
    }
}

/// A decoded frame together with its envelope
#[derive(Debug, Clone, PartialEq)]
pub struct InboundFrame {
    pub message: InboundMessage,
    pub envelope: Envelope,
}

/// Welcome frame
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectedEvent {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Full roster snapshot
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PresenceUpdateEvent {
    #[serde(default)]
    pub users: Vec<PresenceEntry>,
    #[serde(default)]
    pub count: Option<usize>,
}

impl PresenceUpdateEvent {
    /// Number of connections reported by the server, falling back to the roster size
    #[must_use]
    pub fn count(&self) -> usize {
        self.count.unwrap_or(self.users.len())
    }

    #[must_use]
    pub fn into_roster(self) -> Roster {
        Roster::from(self.users)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContactCreatedEvent {
    pub contact: Contact,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_by_name: Option<String>,
    #[serde(default)]
    pub created_by_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContactUpdatedEvent {
    pub contact_id: String,
    #[serde(default)]
    pub changes: ContactChanges,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub updated_by_name: Option<String>,
    #[serde(default)]
    pub updated_by_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContactDeletedEvent {
    pub contact_id: String,
    #[serde(default)]
    pub deleted_by: Option<String>,
    #[serde(default)]
    pub deleted_by_name: Option<String>,
    #[serde(default)]
    pub deleted_by_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NoteAddedEvent {
    pub contact_id: String,
    pub note: String,
    #[serde(default)]
    pub added_by: Option<String>,
    #[serde(default)]
    pub added_by_name: Option<String>,
    #[serde(default)]
    pub added_by_email: Option<String>,
}

/// Another user started or stopped typing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TypingEvent {
    pub contact_id: String,
    pub field: String,
    /// Servers omit this for "started typing"
    #[serde(default = "default_is_typing")]
    pub is_typing: bool,
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

fn default_is_typing() -> bool {
    true
}

/// Another user's cursor moved
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CursorPositionEvent {
    pub x: f64,
    pub y: f64,
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

/// Server-reported error; the connection stays open
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorEvent {
    #[serde(default)]
    pub message: String,
}

fn actor(user_id: Option<&str>, name: Option<&str>, email: Option<&str>) -> Actor {
    Actor {
        user_id: user_id.map(str::to_string),
        name: name.map(str::to_string),
        email: email.map(str::to_string),
    }
}

impl ContactCreatedEvent {
    #[must_use]
    pub fn actor(&self) -> Actor {
        actor(
            self.created_by.as_deref(),
            self.created_by_name.as_deref(),
            self.created_by_email.as_deref(),
        )
    }

    #[must_use]
    pub fn into_notice(self) -> MutationNotice {
        MutationNotice::Created { contact: self.contact }
    }
}

impl ContactUpdatedEvent {
    #[must_use]
    pub fn actor(&self) -> Actor {
        actor(
            self.updated_by.as_deref(),
            self.updated_by_name.as_deref(),
            self.updated_by_email.as_deref(),
        )
    }

    #[must_use]
    pub fn into_notice(self) -> MutationNotice {
        MutationNotice::Updated {
            contact_id: self.contact_id,
            changes: self.changes,
        }
    }
}

impl ContactDeletedEvent {
    #[must_use]
    pub fn actor(&self) -> Actor {
        actor(
            self.deleted_by.as_deref(),
            self.deleted_by_name.as_deref(),
            self.deleted_by_email.as_deref(),
        )
    }

    #[must_use]
    pub fn into_notice(self) -> MutationNotice {
        MutationNotice::Deleted { contact_id: self.contact_id }
    }
}

impl NoteAddedEvent {
    #[must_use]
    pub fn actor(&self) -> Actor {
        actor(
            self.added_by.as_deref(),
            self.added_by_name.as_deref(),
            self.added_by_email.as_deref(),
        )
    }

    #[must_use]
    pub fn into_notice(self) -> MutationNotice {
        MutationNotice::NoteAdded {
            contact_id: self.contact_id,
            note: self.note,
        }
    }
}
