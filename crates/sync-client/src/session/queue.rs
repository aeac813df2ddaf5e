//! Outbound queue
//!
//! Buffers messages composed while the transport is not open.

use crate::protocol::OutboundMessage;
use std::collections::VecDeque;
use sync_common::{SyncError, SyncResult};

/// FIFO buffer of pending outbound messages
#[derive(Debug, Default)]
pub struct OutboundQueue {
    messages: VecDeque<OutboundMessage>,
    limit: Option<usize>,
}

impl OutboundQueue {
    /// Create an unbounded queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue that rejects pushes beyond `limit` messages
    #[must_use]
    pub fn bounded(limit: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            limit: Some(limit),
        }
    }

    /// Append to the tail
    ///
    /// # Errors
    /// Returns `QueueFull` if the queue is bounded and full; the message is not queued
    pub fn push(&mut self, message: OutboundMessage) -> SyncResult<()> {
        if let Some(limit) = self.limit {
            if self.messages.len() >= limit {
                return Err(SyncError::QueueFull(limit));
            }
        }
        self.messages.push_back(message);
        Ok(())
    }

    /// Put messages that were handed out but never sent back at the head, in order
    ///
    /// Requeued messages were already accepted once, so the bound does not apply.
    pub fn requeue_front(&mut self, messages: Vec<OutboundMessage>) {
        for message in messages.into_iter().rev() {
            self.messages.push_front(message);
        }
    }

    /// Remove and return every message in FIFO order
    pub fn drain(&mut self) -> Vec<OutboundMessage> {
        self.messages.drain(..).collect()
    }

    /// Discard everything
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Snapshot of the pending messages in FIFO order
    #[must_use]
    pub fn snapshot(&self) -> Vec<OutboundMessage> {
        self.messages.iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn typing(n: usize) -> OutboundMessage {
        OutboundMessage::typing(format!("c{n}"), "name", true)
    }

    #[test]
    fn test_fifo_drain() {
        let mut queue = OutboundQueue::new();
        queue.push(typing(1)).unwrap();
        queue.push(typing(2)).unwrap();
        queue.push(OutboundMessage::Ping).unwrap();

        assert_eq!(queue.drain(), vec![typing(1), typing(2), OutboundMessage::Ping]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_bounded_rejects_without_dropping() {
        let mut queue = OutboundQueue::bounded(2);
        queue.push(typing(1)).unwrap();
        queue.push(typing(2)).unwrap();

        assert_eq!(queue.push(typing(3)), Err(SyncError::QueueFull(2)));
        assert_eq!(queue.snapshot(), vec![typing(1), typing(2)]);
    }

    #[test]
    fn test_requeue_front_keeps_order_and_ignores_bound() {
        let mut queue = OutboundQueue::bounded(1);
        queue.push(typing(3)).unwrap();
        queue.requeue_front(vec![typing(1), typing(2)]);

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.drain(), vec![typing(1), typing(2), typing(3)]);
    }

    proptest! {
        #[test]
        fn test_drain_preserves_push_order(ids in proptest::collection::vec(0usize..1000, 0..64)) {
            let mut queue = OutboundQueue::new();
            for id in &ids {
                queue.push(typing(*id)).unwrap();
            }
            let drained = queue.drain();
            let expected: Vec<_> = ids.iter().map(|id| typing(*id)).collect();
            prop_assert_eq!(drained, expected);
        }
    }
}
