//! Contact entities and mutation notices
//!
//! Contacts are owned by the query layer. This crate only relays the
//! mutations other workspace members make to them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Partial contact fields carried by an update
pub type ContactChanges = Map<String, Value>;

/// Contact record as exchanged over the wire
///
/// Only the identifier and name are known here; everything else is carried through
/// untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Contact {
    /// Create a contact with only an id and a name
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
            phone: None,
            company: None,
            notes: None,
            extra: Map::new(),
        }
    }

    /// Set the email
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the company
    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Attach an arbitrary extra field
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// The workspace member who caused a mutation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Actor {
    /// Best label for the actor
    #[must_use]
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .or(self.user_id.as_deref())
            .unwrap_or("Someone")
    }
}

/// A contact mutation relayed between workspace members
#[derive(Debug, Clone, PartialEq)]
pub enum MutationNotice {
    Created { contact: Contact },
    Updated { contact_id: String, changes: ContactChanges },
    Deleted { contact_id: String },
    NoteAdded { contact_id: String, note: String },
}

impl MutationNotice {
    /// The contact this notice is about
    #[must_use]
    pub fn contact_id(&self) -> &str {
        match self {
            Self::Created { contact } => &contact.id,
            Self::Updated { contact_id, .. }
            | Self::Deleted { contact_id }
            | Self::NoteAdded { contact_id, .. } => contact_id,
        }
    }

    /// Short name of the mutation kind
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Updated { .. } => "updated",
            Self::Deleted { .. } => "deleted",
            Self::NoteAdded { .. } => "note_added",
        }
    }
}
