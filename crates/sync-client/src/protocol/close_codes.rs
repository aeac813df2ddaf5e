//! WebSocket close codes
//!
//! Close codes the workspace server is known to send.

use std::fmt;

/// Close codes seen on workspace connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CloseCode {
    /// Normal closure
    Normal = 1000,
    /// Server going away (restart, deploy)
    GoingAway = 1001,
    /// Connection dropped without a close frame
    Abnormal = 1006,
    /// Token missing or rejected
    Unauthorized = 4001,
    /// User is not a member of the workspace
    AccessDenied = 4003,
}

impl CloseCode {
    /// Create a `CloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1000 => Some(Self::Normal),
            1001 => Some(Self::GoingAway),
            1006 => Some(Self::Abnormal),
            4001 => Some(Self::Unauthorized),
            4003 => Some(Self::AccessDenied),
            _ => None,
        }
    }

    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Check if the close was caused by the server rejecting the session
    #[must_use]
    pub const fn is_rejection(self) -> bool {
        matches!(self, Self::Unauthorized | Self::AccessDenied)
    }

    /// Get the description for this close code
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Normal => "Normal closure",
            Self::GoingAway => "Server going away",
            Self::Abnormal => "Connection lost",
            Self::Unauthorized => "Unauthorized",
            Self::AccessDenied => "Access denied",
        }
    }

    /// Describe a raw close code, including codes this client does not know
    #[must_use]
    pub fn describe(value: u16) -> String {
        Self::from_u16(value).map_or_else(|| format!("Unknown close code ({value})"), |c| c.to_string())
    }
}

impl fmt::Display for CloseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_u16())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_code_from_u16() {
        assert_eq!(CloseCode::from_u16(4001), Some(CloseCode::Unauthorized));
        assert_eq!(CloseCode::from_u16(4003), Some(CloseCode::AccessDenied));
        assert_eq!(CloseCode::from_u16(1000), Some(CloseCode::Normal));
        assert_eq!(CloseCode::from_u16(4002), None);
    }

    #[test]
    fn test_rejection() {
        assert!(CloseCode::Unauthorized.is_rejection());
        assert!(CloseCode::AccessDenied.is_rejection());
        assert!(!CloseCode::GoingAway.is_rejection());
    }

    #[test]
    fn test_describe() {
        assert_eq!(CloseCode::describe(4001), "Unauthorized (4001)");
        assert_eq!(CloseCode::describe(4999), "Unknown close code (4999)");
        assert_eq!(u16::from(CloseCode::AccessDenied), 4003);
    }
}
