//! Typing aggregator
//!
//! Tracks who is typing in which field. An entry lives until the user says
//! they stopped or until it goes unrefreshed for the typing timeout.

use std::sync::Arc;
use std::time::Duration;
use sync_core::{Clock, TypingEntry, TypingKey};

/// Default typing timeout in milliseconds
pub const TYPING_TIMEOUT_MS: u64 = 3000;

/// Per (subject, field) set of typing users with expiry
pub struct TypingAggregator {
    clock: Arc<dyn Clock>,
    timeout: Duration,
    /// Entries in first-seen order
    entries: Vec<TypingEntry>,
}

impl TypingAggregator {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, timeout: Duration) -> Self {
        Self {
            clock,
            timeout,
            entries: Vec::new(),
        }
    }

    /// Record a typing signal
    ///
    /// `true` inserts or refreshes the entry; `false` removes it at once.
    pub fn note_typing(
        &mut self,
        user_id: &str,
        user_name: Option<&str>,
        subject_id: &str,
        field: &str,
        is_typing: bool,
    ) {
        let now = self.clock.now();
        self.entries.retain(|entry| entry.is_live(now));

        let key = TypingKey::new(user_id, subject_id, field);
        let existing = self.entries.iter().position(|entry| entry.key() == key);

        match (existing, is_typing) {
            (Some(index), true) => {
                let entry = &mut self.entries[index];
                entry.expires_at = now + self.timeout;
                if user_name.is_some() {
                    entry.user_name = user_name.map(str::to_string);
                }
            }
            (None, true) => self.entries.push(TypingEntry {
                user_id: key.user_id,
                user_name: user_name.map(str::to_string),
                subject_id: key.subject_id,
                field: key.field,
                expires_at: now + self.timeout,
            }),
            (Some(index), false) => {
                self.entries.remove(index);
            }
            (None, false) => {}
        }
    }

    /// Users currently typing in `field` of `subject_id`, in first-seen order
    #[must_use]
    pub fn typing_users_for(&self, subject_id: &str, field: &str) -> Vec<TypingEntry> {
        let now = self.clock.now();
        self.entries
            .iter()
            .filter(|entry| entry.is_live(now) && entry.matches(subject_id, field))
            .cloned()
            .collect()
    }

    /// Drop expired entries, returning how many were removed
    pub fn sweep(&mut self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|entry| entry.is_live(now));
        before - self.entries.len()
    }

    /// Human-readable indicator, e.g. "Ada and Grace are typing"
    #[must_use]
    pub fn typing_label(&self, subject_id: &str, field: &str) -> Option<String> {
        let users = self.typing_users_for(subject_id, field);
        let name = |entry: &TypingEntry, fallback: &'static str| -> String {
            entry
                .user_name
                .as_deref()
                .filter(|name| !name.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };

        match users.as_slice() {
            [] => None,
            [only] => Some(format!("{} is typing", name(only, "Someone"))),
            [first, second] => Some(format!(
                "{} and {} are typing",
                name(first, "Someone"),
                name(second, "someone else")
            )),
            many => Some(format!("{} people are typing", many.len())),
        }
    }

    /// Number of entries held, expired ones not yet swept included
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
