//! Event types

use crate::session::ConnectionState;
use std::fmt;
use sync_core::{Actor, MutationNotice, Roster};

/// Event kinds, used to filter subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ConnectionChanged,
    Welcome,
    PresenceUpdated,
    ContactCreated,
    ContactUpdated,
    ContactDeleted,
    NoteAdded,
    Typing,
    CursorPosition,
    ServerError,
}

impl EventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConnectionChanged => "connection_changed",
            Self::Welcome => "welcome",
            Self::PresenceUpdated => "presence_updated",
            Self::ContactCreated => "contact_created",
            Self::ContactUpdated => "contact_updated",
            Self::ContactDeleted => "contact_deleted",
            Self::NoteAdded => "note_added",
            Self::Typing => "typing",
            Self::CursorPosition => "cursor_position",
            Self::ServerError => "server_error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that happened in the workspace session
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// The connection indicator changed
    ConnectionChanged { state: ConnectionState },
    /// The server accepted the connection
    Welcome { message: String },
    /// A new roster replaced the previous one
    PresenceUpdated { roster: Roster, count: usize },
    /// Another member changed a contact
    ContactMutated { notice: MutationNotice, actor: Actor },
    /// Another member started or stopped typing
    Typing {
        contact_id: String,
        field: String,
        user_id: String,
        user_name: Option<String>,
        is_typing: bool,
    },
    /// Another member moved their cursor
    CursorPosition {
        x: f64,
        y: f64,
        user_id: String,
        user_name: Option<String>,
    },
    /// The server rejected something; the connection stays open
    ServerError { message: String },
}

impl SyncEvent {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::ConnectionChanged { .. } => EventKind::ConnectionChanged,
            Self::Welcome { .. } => EventKind::Welcome,
            Self::PresenceUpdated { .. } => EventKind::PresenceUpdated,
            Self::ContactMutated { notice, .. } => match notice {
                MutationNotice::Created { .. } => EventKind::ContactCreated,
                MutationNotice::Updated { .. } => EventKind::ContactUpdated,
                MutationNotice::Deleted { .. } => EventKind::ContactDeleted,
                MutationNotice::NoteAdded { .. } => EventKind::NoteAdded,
            },
            Self::Typing { .. } => EventKind::Typing,
            Self::CursorPosition { .. } => EventKind::CursorPosition,
            Self::ServerError { .. } => EventKind::ServerError,
        }
    }

    /// The contact mutation carried by this event, if any
    #[must_use]
    pub fn mutation(&self) -> Option<(&MutationNotice, &Actor)> {
        match self {
            Self::ContactMutated { notice, actor } => Some((notice, actor)),
            _ => None,
        }
    }
}
