//! Typing entities

use std::time::Instant;

/// Identifies one typing signal: who is typing where
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypingKey {
    pub user_id: String,
    pub subject_id: String,
    pub field: String,
}

impl TypingKey {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        subject_id: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            subject_id: subject_id.into(),
            field: field.into(),
        }
    }
}

/// A user currently typing in a field of a subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingEntry {
    pub user_id: String,
    pub user_name: Option<String>,
    pub subject_id: String,
    pub field: String,
    /// Entry is dropped at or after this instant unless refreshed
    pub expires_at: Instant,
}

impl TypingEntry {
    /// Check whether the entry is still live at `now`
    #[must_use]
    pub fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    /// Check whether this entry belongs to a subject/field
    #[must_use]
    pub fn matches(&self, subject_id: &str, field: &str) -> bool {
        self.subject_id == subject_id && self.field == field
    }

    /// The key identifying this entry
    #[must_use]
    pub fn key(&self) -> TypingKey {
        TypingKey::new(&self.user_id, &self.subject_id, &self.field)
    }
}
