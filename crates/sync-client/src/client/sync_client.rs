//! Client handle
//!
//! `SyncClient` owns one session: start it once, stop it once. Everything
//! else is queries over local state and thin wrappers over the outbound queue.

use super::{driver, SessionCallbacks, Shared, TokioClock};
use crate::events::EventBroadcaster;
use crate::presence::PresenceStore;
use crate::protocol::OutboundMessage;
use crate::session::{ConnectionState, Delivery, SessionController, Transition};
use crate::transport::{Connector, WsConnector};
use crate::typing::TypingAggregator;
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use std::sync::Arc;
use sync_common::{SyncConfig, SyncError, SyncResult};
use sync_core::{Clock, Contact, ContactChanges, Roster, TypingEntry};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, Instrument};
use uuid::Uuid;

/// Builder for `SyncClient`
pub struct SyncClientBuilder {
    config: SyncConfig,
    connector: Option<Arc<dyn Connector>>,
    clock: Option<Arc<dyn Clock>>,
    events: Option<Arc<EventBroadcaster>>,
    callbacks: SessionCallbacks,
}

impl SyncClientBuilder {
    #[must_use]
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            connector: None,
            clock: None,
            events: None,
            callbacks: SessionCallbacks::default(),
        }
    }

    /// Use a custom connector instead of WebSockets
    #[must_use]
    pub fn connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Some(Arc::new(connector));
        self
    }

    /// Use a custom clock for typing expiry
    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Publish into an existing broadcaster
    #[must_use]
    pub fn events(mut self, events: Arc<EventBroadcaster>) -> Self {
        self.events = Some(events);
        self
    }

    #[must_use]
    pub fn callbacks(mut self, callbacks: SessionCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    #[must_use]
    pub fn on_connected(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.callbacks = self.callbacks.on_connected(f);
        self
    }

    #[must_use]
    pub fn on_disconnected(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.callbacks = self.callbacks.on_disconnected(f);
        self
    }

    #[must_use]
    pub fn on_error(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.callbacks = self.callbacks.on_error(f);
        self
    }

    #[must_use]
    pub fn build(self) -> SyncClient {
        let connector = self
            .connector
            .unwrap_or_else(|| Arc::new(WsConnector::new(self.config.connect_timeout())));
        let clock = self.clock.unwrap_or_else(|| Arc::new(TokioClock));
        let typing = TypingAggregator::new(clock, self.config.typing_timeout());

        let shared = Arc::new(Shared {
            controller: Mutex::new(SessionController::new(self.config.max_queued_messages)),
            presence: RwLock::new(PresenceStore::new()),
            typing: Mutex::new(typing),
            events: self.events.unwrap_or_default(),
            callbacks: self.callbacks,
            connector,
            config: self.config,
        });

        let (shutdown_tx, _) = watch::channel(false);

        SyncClient {
            shared,
            shutdown_tx,
            task: Mutex::new(None),
            session_id: Uuid::new_v4(),
        }
    }
}

/// Real-time workspace sync client
pub struct SyncClient {
    shared: Arc<Shared>,
    shutdown_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
    session_id: Uuid,
}

impl SyncClient {
    /// Create a client that connects over WebSockets
    #[must_use]
    pub fn new(config: SyncConfig) -> Self {
        Self::builder(config).build()
    }

    #[must_use]
    pub fn builder(config: SyncConfig) -> SyncClientBuilder {
        SyncClientBuilder::new(config)
    }

    /// Start the session and begin connecting
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Fails without attempting a connection if the workspace id, user id or
    /// token is missing, the endpoint is invalid, the session was already
    /// started or stopped, or no runtime is available
    pub fn start(&self) -> SyncResult<()> {
        let config = &self.shared.config;
        config.validate()?;
        let url = config.endpoint_url()?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| SyncError::NoRuntime)?;

        let transition = {
            let mut controller = self.shared.controller.lock();
            controller.mark_started()?;
            controller.begin_connecting()
        };

        info!(
            session_id = %self.session_id,
            workspace_id = %config.workspace_id,
            "Starting workspace session"
        );
        self.shared.report(transition);

        let span = tracing::info_span!(
            "sync_session",
            session_id = %self.session_id,
            workspace_id = %config.workspace_id
        );
        let task = runtime.spawn(
            driver::run(Arc::clone(&self.shared), url, self.shutdown_tx.subscribe())
                .instrument(span),
        );
        *self.task.lock() = Some(task);

        Ok(())
    }

    /// Tear the session down
    ///
    /// Cancels reconnect and heartbeat timers, closes the transport and
    /// discards queued messages. Idempotent.
    pub fn stop(&self) {
        let previous = self.shared.controller.lock().stop();
        let Some(previous) = previous else {
            return;
        };

        let _ = self.shutdown_tx.send(true);
        self.shared.presence.write().clear();
        self.shared.typing.lock().clear();

        info!(session_id = %self.session_id, "Workspace session stopped");
        self.shared.report(Some(Transition {
            from: previous,
            to: ConnectionState::Disconnected,
        }));
    }

    /// Stop and wait for the driver task to finish
    pub async fn shutdown(&self) {
        self.stop();
        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                debug!(error = %e, "Session driver ended abnormally");
            }
        }
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared.controller.lock().state()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.shared.config
    }

    /// Broadcaster that receives every parsed inbound event
    #[must_use]
    pub fn events(&self) -> &Arc<EventBroadcaster> {
        &self.shared.events
    }

    // === Sending ===

    /// Send now when connected, otherwise queue until the next connection
    ///
    /// # Errors
    /// Returns `Stopped` after `stop` and `QueueFull` when a bounded queue is full
    pub fn send(&self, message: OutboundMessage) -> SyncResult<Delivery> {
        let kind = message.kind().to_string();
        let delivery = self.shared.controller.lock().enqueue_or_send(message)?;
        debug!(kind = %kind, delivery = ?delivery, "Message accepted");
        Ok(delivery)
    }

    /// # Errors
    /// See [`SyncClient::send`]
    pub fn send_contact_created(&self, contact: Contact) -> SyncResult<Delivery> {
        self.send(OutboundMessage::ContactCreated { contact })
    }

    /// # Errors
    /// See [`SyncClient::send`]
    pub fn send_contact_updated(
        &self,
        contact_id: impl Into<String>,
        changes: ContactChanges,
    ) -> SyncResult<Delivery> {
        self.send(OutboundMessage::contact_updated(contact_id, changes))
    }

    /// # Errors
    /// See [`SyncClient::send`]
    pub fn send_contact_deleted(&self, contact_id: impl Into<String>) -> SyncResult<Delivery> {
        self.send(OutboundMessage::contact_deleted(contact_id))
    }

    /// # Errors
    /// See [`SyncClient::send`]
    pub fn send_note_added(
        &self,
        contact_id: impl Into<String>,
        note: impl Into<String>,
    ) -> SyncResult<Delivery> {
        self.send(OutboundMessage::note_added(contact_id, note))
    }

    /// # Errors
    /// See [`SyncClient::send`]
    pub fn send_typing(
        &self,
        contact_id: impl Into<String>,
        field: impl Into<String>,
        is_typing: bool,
    ) -> SyncResult<Delivery> {
        self.send(OutboundMessage::typing(contact_id, field, is_typing))
    }

    /// # Errors
    /// See [`SyncClient::send`]
    pub fn send_cursor_position(&self, x: f64, y: f64) -> SyncResult<Delivery> {
        self.send(OutboundMessage::CursorPosition { x, y })
    }

    /// # Errors
    /// See [`SyncClient::send`]
    pub fn send_custom(
        &self,
        kind: impl Into<String>,
        fields: Map<String, Value>,
    ) -> SyncResult<Delivery> {
        self.send(OutboundMessage::custom(kind, fields))
    }

    /// Messages waiting for a connection, in send order
    #[must_use]
    pub fn queued_messages(&self) -> Vec<OutboundMessage> {
        self.shared.controller.lock().queued()
    }

    // === Presence ===

    /// The latest roster snapshot
    #[must_use]
    pub fn current_roster(&self) -> Roster {
        self.shared.presence.read().current_roster().clone()
    }

    /// Connection count reported with the latest roster
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.shared.presence.read().connection_count()
    }

    // === Typing ===

    /// Users currently typing in a field, expired entries excluded
    #[must_use]
    pub fn typing_users_for(&self, contact_id: &str, field: &str) -> Vec<TypingEntry> {
        self.shared.typing.lock().typing_users_for(contact_id, field)
    }

    /// Indicator text for a field, `None` when nobody is typing
    #[must_use]
    pub fn typing_label(&self, contact_id: &str, field: &str) -> Option<String> {
        self.shared.typing.lock().typing_label(contact_id, field)
    }

    /// Drop expired typing entries
    pub fn sweep_typing(&self) -> usize {
        self.shared.typing.lock().sweep()
    }
}

impl Drop for SyncClient {
    fn drop(&mut self) {
        self.stop();
    }
}
