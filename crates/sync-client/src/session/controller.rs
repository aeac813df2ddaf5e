//! Session controller
//!
//! Owns the connection state, the outbound queue and the writer handle of
//! the live transport. It performs no I/O: the driver reports transport
//! lifecycle events and acts on the transitions returned.

use super::{ConnectionState, OutboundQueue};
use crate::protocol::OutboundMessage;
use sync_common::{SyncError, SyncResult};
use tokio::sync::mpsc;

/// Where an accepted message went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the live transport
    Sent,
    /// Buffered until the next connection opens
    Queued,
}

/// A state change the driver must report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ConnectionState,
    pub to: ConnectionState,
}

impl Transition {
    /// Entering `Connected`
    #[must_use]
    pub fn connected(self) -> bool {
        self.to.is_connected() && !self.from.is_connected()
    }

    /// Leaving `Connected`
    #[must_use]
    pub fn disconnected(self) -> bool {
        self.from.is_connected() && !self.to.is_connected()
    }

    #[must_use]
    pub fn is_change(self) -> bool {
        self.from != self.to
    }
}

/// Session state machine
#[derive(Debug, Default)]
pub struct SessionController {
    state: ConnectionState,
    queue: OutboundQueue,
    writer: Option<mpsc::UnboundedSender<OutboundMessage>>,
    started: bool,
    stopped: bool,
}

impl SessionController {
    /// Create a controller with an optional queue bound
    #[must_use]
    pub fn new(max_queued: Option<usize>) -> Self {
        Self {
            queue: max_queued.map_or_else(OutboundQueue::new, OutboundQueue::bounded),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Claim the session for a driver
    ///
    /// # Errors
    /// Returns `AlreadyStarted` on a second call and `Stopped` after `stop`
    pub fn mark_started(&mut self) -> SyncResult<()> {
        if self.stopped {
            return Err(SyncError::Stopped);
        }
        if self.started {
            return Err(SyncError::AlreadyStarted);
        }
        self.started = true;
        Ok(())
    }

    /// A connection attempt begins
    pub fn begin_connecting(&mut self) -> Option<Transition> {
        self.transition(ConnectionState::Connecting)
    }

    /// The transport opened
    ///
    /// Flushes the queue into `writer` in FIFO order before any later send can
    /// reach it, then routes sends through it.
    pub fn on_open(
        &mut self,
        writer: mpsc::UnboundedSender<OutboundMessage>,
    ) -> Option<(Transition, usize)> {
        if self.stopped {
            return None;
        }

        let pending = self.queue.drain();
        let mut flushed = 0;
        let mut unsent = Vec::new();
        for message in pending {
            if unsent.is_empty() {
                match writer.send(message) {
                    Ok(()) => flushed += 1,
                    Err(mpsc::error::SendError(message)) => unsent.push(message),
                }
            } else {
                unsent.push(message);
            }
        }

        if !unsent.is_empty() {
            self.queue.requeue_front(unsent);
            return None;
        }

        self.writer = Some(writer);
        self.transition(ConnectionState::Connected)
            .map(|transition| (transition, flushed))
    }

    /// Send now when connected, otherwise append to the queue
    ///
    /// # Errors
    /// Returns `Stopped` after `stop` and `QueueFull` when a bounded queue is full
    pub fn enqueue_or_send(&mut self, message: OutboundMessage) -> SyncResult<Delivery> {
        if self.stopped {
            return Err(SyncError::Stopped);
        }

        let message = match (&self.writer, self.state) {
            (Some(writer), ConnectionState::Connected) => match writer.send(message) {
                Ok(()) => return Ok(Delivery::Sent),
                Err(mpsc::error::SendError(message)) => message,
            },
            _ => message,
        };

        self.queue.push(message)?;
        Ok(Delivery::Queued)
    }

    /// The transport closed or failed
    ///
    /// `failed` is a message taken from the writer whose send did not complete;
    /// it goes back to the head of the queue ahead of anything still buffered
    /// in `pending`.
    pub fn on_close(
        &mut self,
        next: ConnectionState,
        failed: Option<OutboundMessage>,
        pending: &mut mpsc::UnboundedReceiver<OutboundMessage>,
    ) -> Option<Transition> {
        self.writer = None;

        let mut unsent: Vec<OutboundMessage> = failed.into_iter().collect();
        while let Ok(message) = pending.try_recv() {
            unsent.push(message);
        }

        if self.stopped {
            return None;
        }

        self.queue.requeue_front(unsent);
        self.transition(next)
    }

    /// A connection attempt failed before the transport opened
    pub fn on_connect_failed(&mut self, next: ConnectionState) -> Option<Transition> {
        self.transition(next)
    }

    /// Tear the session down for good
    ///
    /// Returns the state the session was in the first time; later calls return `None`.
    pub fn stop(&mut self) -> Option<ConnectionState> {
        if self.stopped {
            return None;
        }
        self.stopped = true;
        self.writer = None;
        self.queue.clear();

        let previous = self.state;
        self.state = ConnectionState::Disconnected;
        Some(previous)
    }

    /// Messages waiting for a connection, in send order
    #[must_use]
    pub fn queued(&self) -> Vec<OutboundMessage> {
        self.queue.snapshot()
    }

    #[must_use]
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    fn transition(&mut self, to: ConnectionState) -> Option<Transition> {
        if self.stopped {
            return None;
        }
        let from = std::mem::replace(&mut self.state, to);
        Some(Transition { from, to })
    }
}
