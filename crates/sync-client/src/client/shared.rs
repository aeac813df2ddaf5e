//! State shared between the client handle and its driver task

use super::SessionCallbacks;
use crate::events::{EventBroadcaster, SyncEvent};
use crate::presence::PresenceStore;
use crate::protocol::{Codec, Decoded, InboundFrame, InboundMessage};
use crate::session::{ConnectionState, SessionController, Transition};
use crate::transport::Connector;
use crate::typing::TypingAggregator;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use sync_common::SyncConfig;
use tracing::{debug, error, info, trace, warn};

pub(crate) struct Shared {
    pub(crate) config: SyncConfig,
    pub(crate) controller: Mutex<SessionController>,
    pub(crate) presence: RwLock<PresenceStore>,
    pub(crate) typing: Mutex<TypingAggregator>,
    pub(crate) events: Arc<EventBroadcaster>,
    pub(crate) callbacks: SessionCallbacks,
    pub(crate) connector: Arc<dyn Connector>,
}

impl Shared {
    /// State to enter after an unexpected close
    pub(crate) fn after_close_state(&self) -> ConnectionState {
        if self.config.auto_reconnect {
            ConnectionState::Reconnecting
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Announce a state change
    ///
    /// Must be called without the controller lock held.
    pub(crate) fn report(&self, transition: Option<Transition>) {
        let Some(transition) = transition.filter(|t| t.is_change()) else {
            return;
        };

        debug!(from = %transition.from, to = %transition.to, "Connection state changed");

        if transition.connected() {
            self.callbacks.connected();
        }
        if transition.disconnected() {
            self.callbacks.disconnected();
        }

        self.events.publish(&SyncEvent::ConnectionChanged { state: transition.to });
    }

    /// Decode one inbound frame, update local state and publish the result
    pub(crate) fn handle_frame(&self, text: &str) {
        let frame = match Codec::decode(text) {
            Ok(Decoded::Message(frame)) => frame,
            Ok(Decoded::Ignored(kind)) => {
                debug!(kind = %kind, "Ignoring unhandled frame type");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Dropping malformed frame");
                return;
            }
        };

        trace!(kind = %frame.message.kind(), "Frame received");

        if let Some(event) = self.apply(frame) {
            self.events.publish(&event);
        }
    }

    fn apply(&self, frame: InboundFrame) -> Option<SyncEvent> {
        if let Some(workspace_id) = frame.envelope.workspace_id.as_deref() {
            if workspace_id != self.config.workspace_id {
                warn!(
                    frame_workspace = workspace_id,
                    kind = %frame.message.kind(),
                    "Dropping frame addressed to another workspace"
                );
                return None;
            }
        }

        match frame.message {
            InboundMessage::Connected(event) => {
                info!(greeting = %event.message, "Server accepted session");
                Some(SyncEvent::Welcome { message: event.message })
            }
            InboundMessage::PresenceUpdate(event) => {
                let count = event.count();
                let roster = event.into_roster();
                self.presence.write().apply_roster_snapshot(roster.clone(), count);
                debug!(users = roster.len(), count, "Roster replaced");
                Some(SyncEvent::PresenceUpdated { roster, count })
            }
            InboundMessage::ContactCreated(event) => {
                let actor = event.actor();
                Some(SyncEvent::ContactMutated { notice: event.into_notice(), actor })
            }
            InboundMessage::ContactUpdated(event) => {
                let actor = event.actor();
                Some(SyncEvent::ContactMutated { notice: event.into_notice(), actor })
            }
            InboundMessage::ContactDeleted(event) => {
                let actor = event.actor();
                Some(SyncEvent::ContactMutated { notice: event.into_notice(), actor })
            }
            InboundMessage::NoteAdded(event) => {
                let actor = event.actor();
                Some(SyncEvent::ContactMutated { notice: event.into_notice(), actor })
            }
            InboundMessage::Typing(event) => {
                self.typing.lock().note_typing(
                    &event.user_id,
                    event.user_name.as_deref(),
                    &event.contact_id,
                    &event.field,
                    event.is_typing,
                );
                Some(SyncEvent::Typing {
                    contact_id: event.contact_id,
                    field: event.field,
                    user_id: event.user_id,
                    user_name: event.user_name,
                    is_typing: event.is_typing,
                })
            }
            InboundMessage::CursorPosition(event) => Some(SyncEvent::CursorPosition {
                x: event.x,
                y: event.y,
                user_id: event.user_id,
                user_name: event.user_name,
            }),
            InboundMessage::Error(event) => {
                error!(reason = %event.message, "Server reported an error");
                self.callbacks.error(&event.message);
                Some(SyncEvent::ServerError { message: event.message })
            }
            InboundMessage::Pong => {
                trace!("Pong received");
                None
            }
        }
    }
}
