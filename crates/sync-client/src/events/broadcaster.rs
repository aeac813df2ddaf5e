//! Event broadcaster
//!
//! Fans events out to registered listeners in registration order. Listeners
//! outlive connections; events published before a listener registered are
//! not replayed.

use super::{EventKind, SyncEvent};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

type Listener = Arc<dyn Fn(&SyncEvent) + Send + Sync>;

/// Handle for removing a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    filter: Option<EventKind>,
    listener: Listener,
}

/// Publish/subscribe boundary between the session and the application
#[derive(Default)]
pub struct EventBroadcaster {
    next_id: AtomicU64,
    registrations: RwLock<Vec<Registration>>,
}

impl EventBroadcaster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for one kind of event
    pub fn subscribe<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&SyncEvent) + Send + Sync + 'static,
    {
        self.register(Some(kind), Arc::new(listener))
    }

    /// Listen for every event
    pub fn subscribe_all<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&SyncEvent) + Send + Sync + 'static,
    {
        self.register(None, Arc::new(listener))
    }

    /// Receive events on a channel instead of a callback
    ///
    /// The listener stays registered until `unsubscribe` is called; events
    /// published after the receiver is dropped are discarded.
    pub fn channel(
        &self,
        kind: Option<EventKind>,
    ) -> (ListenerId, mpsc::UnboundedReceiver<SyncEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.register(
            kind,
            Arc::new(move |event: &SyncEvent| {
                let _ = tx.send(event.clone());
            }),
        );
        (id, rx)
    }

    /// Remove a listener; returns false if it was already gone
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut registrations = self.registrations.write();
        let before = registrations.len();
        registrations.retain(|registration| registration.id != id);
        registrations.len() != before
    }

    /// Deliver an event to every matching listener, returning how many saw it
    ///
    /// Listeners run on the caller's task without any lock held, so a
    /// listener may subscribe or unsubscribe.
    pub fn publish(&self, event: &SyncEvent) -> usize {
        let kind = event.kind();
        let listeners: Vec<Listener> = self
            .registrations
            .read()
            .iter()
            .filter(|registration| registration.filter.map_or(true, |filter| filter == kind))
            .map(|registration| Arc::clone(&registration.listener))
            .collect();

        for listener in &listeners {
            listener(event);
        }

        tracing::trace!(event = %kind, listeners = listeners.len(), "Event published");
        listeners.len()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registrations.read().len()
    }

    fn register(&self, filter: Option<EventKind>, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registrations.write().push(Registration {
            id,
            filter,
            listener,
        });
        id
    }
}
