//! Lifecycle callbacks

use std::sync::Arc;

type Callback = Arc<dyn Fn() + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Optional hooks invoked by the session
///
/// Hooks run on the session task, never while session state is locked, so
/// they may call back into the client.
#[derive(Clone, Default)]
pub struct SessionCallbacks {
    on_connected: Option<Callback>,
    on_disconnected: Option<Callback>,
    on_error: Option<ErrorCallback>,
}

impl SessionCallbacks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called on entering `Connected`
    #[must_use]
    pub fn on_connected(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_connected = Some(Arc::new(f));
        self
    }

    /// Called on leaving `Connected`
    ///
    /// A connection attempt that fails before opening never entered
    /// `Connected`, so it reports through `on_error` only.
    #[must_use]
    pub fn on_disconnected(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_disconnected = Some(Arc::new(f));
        self
    }

    /// Called for transport failures, rejected sessions and server `error` frames
    #[must_use]
    pub fn on_error(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(f));
        self
    }

    pub(crate) fn connected(&self) {
        if let Some(f) = &self.on_connected {
            f();
        }
    }

    pub(crate) fn disconnected(&self) {
        if let Some(f) = &self.on_disconnected {
            f();
        }
    }

    pub(crate) fn error(&self, message: &str) {
        if let Some(f) = &self.on_error {
            f(message);
        }
    }
}
