//! Frame type discriminators
//!
//! Every frame carries its type in the `type` field.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Known frame types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    // Session
    /// Welcome frame sent after the server accepts the connection
    Connected,
    /// Full roster broadcast
    PresenceUpdate,

    // Contact mutations
    ContactCreated,
    ContactUpdated,
    ContactDeleted,
    NoteAdded,

    // Activity
    Typing,
    CursorPosition,

    // Control
    Error,
    Ping,
    Pong,
}

impl MessageType {
    /// Get the wire name of the type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::PresenceUpdate => "presence_update",
            Self::ContactCreated => "contact_created",
            Self::ContactUpdated => "contact_updated",
            Self::ContactDeleted => "contact_deleted",
            Self::NoteAdded => "note_added",
            Self::Typing => "typing",
            Self::CursorPosition => "cursor_position",
            Self::Error => "error",
            Self::Ping => "ping",
            Self::Pong => "pong",
        }
    }

    /// Parse a wire name
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "connected" => Some(Self::Connected),
            "presence_update" => Some(Self::PresenceUpdate),
            "contact_created" => Some(Self::ContactCreated),
            "contact_updated" => Some(Self::ContactUpdated),
            "contact_deleted" => Some(Self::ContactDeleted),
            "note_added" => Some(Self::NoteAdded),
            "typing" => Some(Self::Typing),
            "cursor_position" => Some(Self::CursorPosition),
            "error" => Some(Self::Error),
            "ping" => Some(Self::Ping),
            "pong" => Some(Self::Pong),
            _ => None,
        }
    }

    /// Check if the server sends this type
    #[must_use]
    pub const fn is_inbound(self) -> bool {
        !matches!(self, Self::Ping)
    }

    /// Check if the client sends this type
    #[must_use]
    pub const fn is_outbound(self) -> bool {
        matches!(
            self,
            Self::ContactCreated
                | Self::ContactUpdated
                | Self::ContactDeleted
                | Self::NoteAdded
                | Self::Typing
                | Self::CursorPosition
                | Self::Ping
        )
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<MessageType> for String {
    fn from(kind: MessageType) -> Self {
        kind.as_str().to_string()
    }
}
