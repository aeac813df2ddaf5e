//! Presence store
//!
//! Holds the latest roster snapshot. Every snapshot replaces the previous one.

use sync_core::{PresenceEntry, Roster};

/// Latest roster broadcast by the server
#[derive(Debug, Clone, Default)]
pub struct PresenceStore {
    roster: Roster,
    /// Connection count reported with the roster
    count: usize,
    /// Number of snapshots applied
    version: u64,
}

impl PresenceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the roster
    pub fn apply_roster_snapshot(&mut self, roster: Roster, count: usize) {
        self.roster = roster;
        self.count = count;
        self.version += 1;
    }

    /// The latest roster
    #[must_use]
    pub fn current_roster(&self) -> &Roster {
        &self.roster
    }

    /// Connection count the server reported (a user may hold several connections)
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Entries other than `user_id`, in roster order
    pub fn others<'a>(
        &'a self,
        user_id: &'a str,
    ) -> impl Iterator<Item = &'a PresenceEntry> + 'a {
        self.roster.iter().filter(move |entry| entry.user_id != user_id)
    }

    /// Users editing a contact, in roster order
    pub fn editing<'a>(
        &'a self,
        contact_id: &'a str,
    ) -> impl Iterator<Item = &'a PresenceEntry> + 'a {
        self.roster
            .iter()
            .filter(move |entry| entry.editing_contact_id.as_deref() == Some(contact_id))
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.roster = Roster::new();
        self.count = 0;
    }
}
