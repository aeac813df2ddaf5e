//! Sync client configuration
//!
//! Loads configuration from environment variables and config files.

use crate::error::{SyncError, SyncResult};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Sync session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Base server URL (`ws://` or `wss://`)
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    #[serde(default)]
    pub workspace_id: String,
    #[serde(default)]
    pub user_id: String,
    /// Access credential sent as the `token` query parameter
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_auto_reconnect")]
    pub auto_reconnect: bool,
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    #[serde(default = "default_typing_timeout_ms")]
    pub typing_timeout_ms: u64,
    /// Bound on messages buffered while offline; unbounded when `None`
    #[serde(default)]
    pub max_queued_messages: Option<usize>,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

// Default value functions
fn default_ws_url() -> String {
    "ws://localhost:8001".to_string()
}

fn default_auto_reconnect() -> bool {
    true
}

fn default_reconnect_interval_ms() -> u64 {
    3000
}

fn default_heartbeat_interval_ms() -> u64 {
    30_000
}

fn default_typing_timeout_ms() -> u64 {
    3000
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            workspace_id: String::new(),
            user_id: String::new(),
            token: String::new(),
            auto_reconnect: default_auto_reconnect(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            typing_timeout_ms: default_typing_timeout_ms(),
            max_queued_messages: None,
            connect_timeout_ms: default_connect_timeout_ms(),
            env: Environment::default(),
        }
    }
}

impl SyncConfig {
    /// Create a configuration for one workspace session with default timings
    #[must_use]
    pub fn new(
        workspace_id: impl Into<String>,
        user_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            user_id: user_id.into(),
            token: token.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_ws_url(mut self, ws_url: impl Into<String>) -> Self {
        self.ws_url = ws_url.into();
        self
    }

    #[must_use]
    pub fn with_auto_reconnect(mut self, auto_reconnect: bool) -> Self {
        self.auto_reconnect = auto_reconnect;
        self
    }

    #[must_use]
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval_ms = duration_to_ms(interval);
        self
    }

    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval_ms = duration_to_ms(interval);
        self
    }

    #[must_use]
    pub fn with_typing_timeout(mut self, timeout: Duration) -> Self {
        self.typing_timeout_ms = duration_to_ms(timeout);
        self
    }

    #[must_use]
    pub fn with_max_queued_messages(mut self, max: usize) -> Self {
        self.max_queued_messages = Some(max);
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = duration_to_ms(timeout);
        self
    }

    #[must_use]
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    #[must_use]
    pub fn typing_timeout(&self) -> Duration {
        Duration::from_millis(self.typing_timeout_ms)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Load configuration from environment variables
    ///
    /// Reads `SYNC_*` variables after loading a `.env` file if one exists.
    ///
    /// # Errors
    /// Returns an error if a variable is present but cannot be parsed
    pub fn from_env() -> SyncResult<Self> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            ws_url: env::var("SYNC_WS_URL").unwrap_or_else(|_| default_ws_url()),
            workspace_id: env::var("SYNC_WORKSPACE_ID").unwrap_or_default(),
            user_id: env::var("SYNC_USER_ID").unwrap_or_default(),
            token: env::var("SYNC_TOKEN").unwrap_or_default(),
            auto_reconnect: parse_var("SYNC_AUTO_RECONNECT")?
                .unwrap_or_else(default_auto_reconnect),
            reconnect_interval_ms: parse_var("SYNC_RECONNECT_INTERVAL_MS")?
                .unwrap_or_else(default_reconnect_interval_ms),
            heartbeat_interval_ms: parse_var("SYNC_HEARTBEAT_INTERVAL_MS")?
                .unwrap_or_else(default_heartbeat_interval_ms),
            typing_timeout_ms: parse_var("SYNC_TYPING_TIMEOUT_MS")?
                .unwrap_or_else(default_typing_timeout_ms),
            max_queued_messages: parse_var("SYNC_MAX_QUEUED_MESSAGES")?,
            connect_timeout_ms: parse_var("SYNC_CONNECT_TIMEOUT_MS")?
                .unwrap_or_else(default_connect_timeout_ms),
            env: env::var("SYNC_ENV")
                .ok()
                .and_then(|s| Environment::parse(&s))
                .unwrap_or_default(),
        })
    }

    /// Load configuration from an optional file layered under `SYNC_` variables
    ///
    /// # Errors
    /// Returns an error if the file cannot be parsed or a value has the wrong type
    pub fn load(path: impl AsRef<Path>) -> SyncResult<Self> {
        let _ = dotenvy::dotenv();

        ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()).required(false))
            .add_source(::config::Environment::with_prefix("SYNC").try_parsing(true))
            .build()
            .and_then(::config::Config::try_deserialize)
            .map_err(|e| SyncError::Config(e.to_string()))
    }

    /// Check the settings a session cannot start without
    ///
    /// # Errors
    /// Returns the first misuse error found
    pub fn validate(&self) -> SyncResult<()> {
        if self.workspace_id.trim().is_empty() {
            return Err(SyncError::MissingWorkspaceId);
        }
        if self.token.trim().is_empty() {
            return Err(SyncError::MissingToken);
        }
        if self.user_id.trim().is_empty() {
            return Err(SyncError::MissingUserId);
        }
        if self.heartbeat_interval_ms == 0 {
            return Err(SyncError::Config("heartbeat_interval_ms must be positive".to_string()));
        }
        if self.reconnect_interval_ms == 0 {
            return Err(SyncError::Config("reconnect_interval_ms must be positive".to_string()));
        }
        self.endpoint_url().map(|_| ())
    }

    /// Build the workspace endpoint: `<base>/ws/workspace/<id>?token=<token>`
    ///
    /// # Errors
    /// Returns `InvalidEndpoint` if the base URL is not a `ws`/`wss` URL
    pub fn endpoint_url(&self) -> SyncResult<Url> {
        let mut url =
            Url::parse(&self.ws_url).map_err(|e| SyncError::InvalidEndpoint(e.to_string()))?;

        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(SyncError::InvalidEndpoint(format!(
                "unsupported scheme: {}",
                url.scheme()
            )));
        }

        url.path_segments_mut()
            .map_err(|()| SyncError::InvalidEndpoint("URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["ws", "workspace", self.workspace_id.as_str()]);

        url.set_query(None);
        url.query_pairs_mut().append_pair("token", &self.token);

        Ok(url)
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> SyncResult<Option<T>> {
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SyncError::Config(format!("Invalid value for {name}: {raw}"))),
        Err(_) => Ok(None),
    }
}

fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
