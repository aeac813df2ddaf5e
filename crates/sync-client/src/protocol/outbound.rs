//! Client-to-server frames

use super::MessageType;
use serde::Serialize;
use serde_json::{Map, Value};
use sync_core::{Contact, ContactChanges, MutationNotice};

/// An intent the client wants delivered to the workspace
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Liveness ping
    Ping,
    ContactCreated { contact: Contact },
    ContactUpdated { contact_id: String, changes: ContactChanges },
    ContactDeleted { contact_id: String },
    NoteAdded { contact_id: String, note: String },
    Typing { contact_id: String, field: String, is_typing: bool },
    CursorPosition { x: f64, y: f64 },
    /// Any other frame type, sent as `{"type": kind, ..fields}`
    #[serde(skip_serializing)]
    Custom { kind: String, fields: Map<String, Value> },
}

impl OutboundMessage {
    #[must_use]
    pub fn typing(contact_id: impl Into<String>, field: impl Into<String>, is_typing: bool) -> Self {
        Self::Typing {
            contact_id: contact_id.into(),
            field: field.into(),
            is_typing,
        }
    }

    #[must_use]
    pub fn contact_updated(contact_id: impl Into<String>, changes: ContactChanges) -> Self {
        Self::ContactUpdated {
            contact_id: contact_id.into(),
            changes,
        }
    }

    #[must_use]
    pub fn contact_deleted(contact_id: impl Into<String>) -> Self {
        Self::ContactDeleted { contact_id: contact_id.into() }
    }

    #[must_use]
    pub fn note_added(contact_id: impl Into<String>, note: impl Into<String>) -> Self {
        Self::NoteAdded {
            contact_id: contact_id.into(),
            note: note.into(),
        }
    }

    /// Build a frame of a type this client has no dedicated variant for
    #[must_use]
    pub fn custom(kind: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self::Custom {
            kind: kind.into(),
            fields,
        }
    }

    /// The known frame type, `None` for custom frames
    #[must_use]
    pub const fn message_type(&self) -> Option<MessageType> {
        match self {
            Self::Ping => Some(MessageType::Ping),
            Self::ContactCreated { .. } => Some(MessageType::ContactCreated),
            Self::ContactUpdated { .. } => Some(MessageType::ContactUpdated),
            Self::ContactDeleted { .. } => Some(MessageType::ContactDeleted),
            Self::NoteAdded { .. } => Some(MessageType::NoteAdded),
            Self::Typing { .. } => Some(MessageType::Typing),
            Self::CursorPosition { .. } => Some(MessageType::CursorPosition),
            Self::Custom { .. } => None,
        }
    }

    /// Wire name of the frame type
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Custom { kind, .. } => kind,
            other => other.message_type().map_or("", MessageType::as_str),
        }
    }

    /// Convert into the JSON object sent on the wire
    ///
    /// # Errors
    /// Returns an error if a contact or change set cannot be represented as JSON
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Custom { kind, fields } => {
                let mut object = fields.clone();
                object.insert("type".to_string(), Value::String(kind.clone()));
                Ok(Value::Object(object))
            }
            other => serde_json::to_value(other),
        }
    }
}

impl From<MutationNotice> for OutboundMessage {
    fn from(notice: MutationNotice) -> Self {
        match notice {
            MutationNotice::Created { contact } => Self::ContactCreated { contact },
            MutationNotice::Updated { contact_id, changes } => {
                Self::ContactUpdated { contact_id, changes }
            }
            MutationNotice::Deleted { contact_id } => Self::ContactDeleted { contact_id },
            MutationNotice::NoteAdded { contact_id, note } => Self::NoteAdded { contact_id, note },
        }
    }
}
