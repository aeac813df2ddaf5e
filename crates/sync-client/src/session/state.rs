//! Connection state

use serde::Serialize;
use std::fmt;

/// Connection state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Not started, stopped, or gave up after a close with auto-reconnect off
    #[default]
    Disconnected,
    /// A connection attempt is in flight
    Connecting,
    /// Transport open; sends go straight out
    Connected,
    /// Waiting out the reconnect delay
    Reconnecting,
}

impl ConnectionState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
        }
    }

    /// Check if sends are delivered immediately
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
