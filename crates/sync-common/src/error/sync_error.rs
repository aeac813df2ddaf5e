//! Sync client error types
//!
//! Errors surfaced to callers of the sync client. Transport and decode
//! failures are recovered internally and never show up here.

/// Caller-facing sync error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    // Misuse errors
    #[error("Missing workspace id")]
    MissingWorkspaceId,

    #[error("Missing access token")]
    MissingToken,

    #[error("Missing user id")]
    MissingUserId,

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Session already started")]
    AlreadyStarted,

    #[error("No async runtime available")]
    NoRuntime,

    // Lifecycle errors
    #[error("Session stopped")]
    Stopped,

    #[error("Outbound queue full ({0} messages)")]
    QueueFull(usize),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Check if this error is caused by how the client was called
    #[must_use]
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            Self::MissingWorkspaceId
                | Self::MissingToken
                | Self::MissingUserId
                | Self::InvalidEndpoint(_)
                | Self::AlreadyStarted
                | Self::NoRuntime
                | Self::Config(_)
        )
    }

    /// Get error code for logs and callbacks
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingWorkspaceId => "MISSING_WORKSPACE_ID",
            Self::MissingToken => "MISSING_TOKEN",
            Self::MissingUserId => "MISSING_USER_ID",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::AlreadyStarted => "ALREADY_STARTED",
            Self::NoRuntime => "NO_RUNTIME",
            Self::Stopped => "STOPPED",
            Self::QueueFull(_) => "QUEUE_FULL",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}

/// Result type alias using `SyncError`
pub type SyncResult<T> = Result<T, SyncError>;
