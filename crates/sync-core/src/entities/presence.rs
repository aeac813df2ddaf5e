//! Presence entities
//!
//! A roster is the full list of users the server reports as connected to a
//! workspace. Rosters are always replaced as a whole, never patched.

use crate::value_objects::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// User presence status
///
/// Unknown or null statuses from the server read as `Online`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    /// User is connected and active
    #[default]
    Online,
    /// User is connected but idle
    Away,
    /// User is gone
    Offline,
}

impl PresenceStatus {
    /// Get the wire name of this status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Away => "away",
            Self::Offline => "offline",
        }
    }

    /// Check if this status counts as connected
    #[must_use]
    pub const fn is_connected(self) -> bool {
        !matches!(self, Self::Offline)
    }
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PresenceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "away" => Ok(Self::Away),
            "offline" => Ok(Self::Offline),
            _ => Err(format!("Invalid status: {s}")),
        }
    }
}

impl<'de> Deserialize<'de> for PresenceStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|s| s.parse().ok()).unwrap_or_default())
    }
}

/// What a user is currently editing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EditingRef {
    /// Contact being edited
    pub contact_id: String,
    /// Field being edited, if the server knows it
    pub field: Option<String>,
}

/// One user in a workspace roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceEntry {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(with = "timestamp")]
    pub joined_at: DateTime<Utc>,
    #[serde(default)]
    pub status: PresenceStatus,
    #[serde(with = "timestamp")]
    pub last_activity: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editing_contact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editing_field: Option<String>,
}

impl PresenceEntry {
    /// Create an online entry that joined and was last active at `at`
    #[must_use]
    pub fn new(user_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            name: None,
            joined_at: at,
            status: PresenceStatus::Online,
            last_activity: at,
            editing_contact_id: None,
            editing_field: None,
        }
    }

    /// Set the display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the email
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the status
    #[must_use]
    pub fn with_status(mut self, status: PresenceStatus) -> Self {
        self.status = status;
        self
    }

    /// Mark the entry as editing a contact (and optionally a field)
    #[must_use]
    pub fn editing(mut self, contact_id: impl Into<String>, field: Option<&str>) -> Self {
        self.editing_contact_id = Some(contact_id.into());
        self.editing_field = field.map(str::to_string);
        self
    }

    /// The contact/field this user is editing, if any
    #[must_use]
    pub fn editing_ref(&self) -> Option<EditingRef> {
        self.editing_contact_id.as_ref().map(|contact_id| EditingRef {
            contact_id: contact_id.clone(),
            field: self.editing_field.clone(),
        })
    }

    /// Best human-readable label: name, then email, then user id
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.user_id)
    }

    /// Avatar initials
    ///
    /// Up to two initials from the name, else the first letter of the email, else `?`.
    #[must_use]
    pub fn initials(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name
                .split_whitespace()
                .filter_map(|part| part.chars().next())
                .flat_map(char::to_uppercase)
                .take(2)
                .collect();
        }

        if let Some(first) = self.email.as_deref().and_then(|e| e.chars().next()) {
            return first.to_uppercase().collect();
        }

        "?".to_string()
    }

    /// Short activity description for presence tooltips
    #[must_use]
    pub fn activity(&self) -> Option<String> {
        match (&self.editing_contact_id, &self.editing_field) {
            (Some(_), Some(field)) => Some(format!("editing {field}")),
            (Some(_), None) => Some("editing contact".to_string()),
            _ => None,
        }
    }
}

/// Full roster snapshot as broadcast by the server
///
/// Keeps the server's ordering so the first entries are the ones shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    entries: Vec<PresenceEntry>,
}

impl Roster {
    /// Create an empty roster
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in broadcast order
    #[must_use]
    pub fn entries(&self) -> &[PresenceEntry] {
        &self.entries
    }

    /// Look up a user
    #[must_use]
    pub fn get(&self, user_id: &str) -> Option<&PresenceEntry> {
        self.entries.iter().find(|e| e.user_id == user_id)
    }

    /// Check if a user is in the roster
    #[must_use]
    pub fn contains(&self, user_id: &str) -> bool {
        self.get(user_id).is_some()
    }

    /// Number of users
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nobody is online
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries
    pub fn iter(&self) -> std::slice::Iter<'_, PresenceEntry> {
        self.entries.iter()
    }

    /// Split into the entries to show and the number left hidden ("+N")
    #[must_use]
    pub fn split_visible(&self, max_display: usize) -> (&[PresenceEntry], usize) {
        let shown = self.entries.len().min(max_display);
        (&self.entries[..shown], self.entries.len() - shown)
    }

    /// Consume into the raw entries
    #[must_use]
    pub fn into_entries(self) -> Vec<PresenceEntry> {
        self.entries
    }
}

impl From<Vec<PresenceEntry>> for Roster {
    fn from(entries: Vec<PresenceEntry>) -> Self {
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a PresenceEntry;
    type IntoIter = std::slice::Iter<'a, PresenceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!("online".parse::<PresenceStatus>(), Ok(PresenceStatus::Online));
        assert_eq!("AWAY".parse::<PresenceStatus>(), Ok(PresenceStatus::Away));
        assert_eq!("offline".parse::<PresenceStatus>(), Ok(PresenceStatus::Offline));
        assert!("idle".parse::<PresenceStatus>().is_err());

        assert_eq!(PresenceStatus::Away.to_string(), "away");
        assert!(PresenceStatus::Away.is_connected());
        assert!(!PresenceStatus::Offline.is_connected());
    }

    #[test]
    fn test_entry_deserializes_server_shape() {
        let json = serde_json::json!({
            "user_id": "u1",
            "email": "ada@example.com",
            "name": "Ada Lovelace",
            "joined_at": "2024-05-01T12:00:00.123456",
            "status": "away",
            "last_activity": "2024-05-01T12:05:00Z",
            "editing_contact_id": "c9",
            "editing_field": null
        });

        let entry: PresenceEntry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.user_id, "u1");
        assert_eq!(entry.status, PresenceStatus::Away);
        assert_eq!(
            entry.editing_ref(),
            Some(EditingRef { contact_id: "c9".to_string(), field: None })
        );
        assert!(entry.last_activity > entry.joined_at);
    }

    #[test]
    fn test_entry_status_defaults_to_online() {
        let json = serde_json::json!({
            "user_id": "u2",
            "joined_at": "2024-05-01T12:00:00",
            "last_activity": "2024-05-01T12:00:00"
        });

        let entry: PresenceEntry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.status, PresenceStatus::Online);
        assert!(entry.editing_ref().is_none());
    }

    #[test]
    fn test_unknown_status_reads_as_online() {
        let users = serde_json::json!([
            {"user_id": "u1", "joined_at": "2024-05-01T12:00:00",
             "status": "busy", "last_activity": "2024-05-01T12:00:00"},
            {"user_id": "u2", "joined_at": "2024-05-01T12:00:00",
             "status": null, "last_activity": "2024-05-01T12:00:00"},
            {"user_id": "u3", "joined_at": "2024-05-01T12:00:00",
             "status": "Away", "last_activity": "2024-05-01T12:00:00"}
        ]);

        let entries: Vec<PresenceEntry> = serde_json::from_value(users).unwrap();
        let statuses: Vec<_> = entries.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![PresenceStatus::Online, PresenceStatus::Online, PresenceStatus::Away]
        );
    }

    #[test]
    fn test_initials() {
        let named = PresenceEntry::new("u1", at()).with_name("ada byron lovelace");
        assert_eq!(named.initials(), "AB");

        let email_only = PresenceEntry::new("u2", at()).with_email("grace@example.com");
        assert_eq!(email_only.initials(), "G");

        let anonymous = PresenceEntry::new("u3", at());
        assert_eq!(anonymous.initials(), "?");
    }

    #[test]
    fn test_display_name_fallbacks() {
        let entry = PresenceEntry::new("u1", at());
        assert_eq!(entry.display_name(), "u1");

        let entry = entry.with_email("a@example.com");
        assert_eq!(entry.display_name(), "a@example.com");

        let entry = entry.with_name("Ada");
        assert_eq!(entry.display_name(), "Ada");
    }

    #[test]
    fn test_activity() {
        let idle = PresenceEntry::new("u1", at());
        assert_eq!(idle.activity(), None);

        let contact = PresenceEntry::new("u1", at()).editing("c1", None);
        assert_eq!(contact.activity().as_deref(), Some("editing contact"));

        let field = PresenceEntry::new("u1", at()).editing("c1", Some("email"));
        assert_eq!(field.activity().as_deref(), Some("editing email"));
    }

    #[test]
    fn test_roster_split_visible() {
        let roster: Roster = (0..7)
            .map(|i| PresenceEntry::new(format!("u{i}"), at()))
            .collect::<Vec<_>>()
            .into();

        let (shown, hidden) = roster.split_visible(5);
        assert_eq!(shown.len(), 5);
        assert_eq!(hidden, 2);
        assert_eq!(shown[0].user_id, "u0");

        let (shown, hidden) = roster.split_visible(10);
        assert_eq!(shown.len(), 7);
        assert_eq!(hidden, 0);
    }

    #[test]
    fn test_roster_lookup() {
        let roster = Roster::from(vec![
            PresenceEntry::new("u1", at()).with_name("Ada"),
            PresenceEntry::new("u2", at()),
        ]);

        assert_eq!(roster.len(), 2);
        assert!(roster.contains("u2"));
        assert!(!roster.contains("u3"));
        assert_eq!(roster.get("u1").and_then(|e| e.name.as_deref()), Some("Ada"));
        assert!(Roster::new().is_empty());
    }
}
