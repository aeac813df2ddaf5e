//! In-memory transport
//!
//! A scripted connector for driving a session without sockets. Every
//! successful `connect` hands a `MemoryPeer` to the paired `MemoryServer`.

use super::{Connector, Transport, TransportError, TransportEvent};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use url::Url;

#[derive(Debug, Default)]
struct ConnectorState {
    attempts: usize,
    refusals: usize,
    urls: Vec<Url>,
}

/// Create a connected connector/server pair
#[must_use]
pub fn memory_pair() -> (MemoryConnector, MemoryServer) {
    let state = Arc::new(Mutex::new(ConnectorState::default()));
    let (accept_tx, accept_rx) = mpsc::unbounded_channel();

    (
        MemoryConnector {
            state: Arc::clone(&state),
            accept_tx,
        },
        MemoryServer { state, accept_rx },
    )
}

/// Client half: implements `Connector`
#[derive(Clone)]
pub struct MemoryConnector {
    state: Arc<Mutex<ConnectorState>>,
    accept_tx: mpsc::UnboundedSender<MemoryPeer>,
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, url: &Url) -> Result<Box<dyn Transport>, TransportError> {
        {
            let mut state = self.state.lock();
            state.attempts += 1;
            state.urls.push(url.clone());
            if state.refusals > 0 {
                state.refusals -= 1;
                return Err(TransportError::Refused("scripted refusal".to_string()));
            }
        }

        let (to_client, incoming) = mpsc::unbounded_channel();
        let (outgoing, from_client) = mpsc::unbounded_channel();

        let peer = MemoryPeer {
            url: url.clone(),
            to_client,
            from_client,
        };
        self.accept_tx
            .send(peer)
            .map_err(|_| TransportError::Refused("server dropped".to_string()))?;

        Ok(Box::new(MemoryTransport {
            incoming,
            outgoing: Some(outgoing),
        }))
    }
}

/// Server half: accepts connections and scripts failures
pub struct MemoryServer {
    state: Arc<Mutex<ConnectorState>>,
    accept_rx: mpsc::UnboundedReceiver<MemoryPeer>,
}

impl MemoryServer {
    /// Wait for the next accepted connection
    pub async fn accept(&mut self) -> Option<MemoryPeer> {
        self.accept_rx.recv().await
    }

    /// Take an accepted connection if one is waiting
    pub fn try_accept(&mut self) -> Option<MemoryPeer> {
        self.accept_rx.try_recv().ok()
    }

    /// Refuse the next `n` connection attempts
    pub fn refuse_next(&self, n: usize) {
        self.state.lock().refusals += n;
    }

    /// Number of connection attempts so far, refused ones included
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.state.lock().attempts
    }

    /// Endpoints of all connection attempts
    #[must_use]
    pub fn urls(&self) -> Vec<Url> {
        self.state.lock().urls.clone()
    }
}

/// The server's view of one connection
pub struct MemoryPeer {
    url: Url,
    to_client: mpsc::UnboundedSender<TransportEvent>,
    from_client: mpsc::UnboundedReceiver<String>,
}

impl MemoryPeer {
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Deliver a raw text frame to the client
    pub fn send_frame(&self, text: impl Into<String>) {
        let _ = self.to_client.send(TransportEvent::Frame(text.into()));
    }

    /// Deliver a JSON frame to the client
    pub fn send_json(&self, value: &serde_json::Value) {
        self.send_frame(value.to_string());
    }

    /// Close the connection with an optional close code
    pub fn close(&self, code: Option<u16>) {
        let _ = self.to_client.send(TransportEvent::Closed {
            code,
            reason: String::new(),
        });
    }

    /// Fail the connection
    pub fn fail(&self) {
        let _ = self.to_client.send(TransportEvent::Error(TransportError::Refused(
            "connection reset".to_string(),
        )));
    }

    /// Wait for the next frame the client sends; `None` once the client closed
    pub async fn next_frame(&mut self) -> Option<String> {
        self.from_client.recv().await
    }

    /// Take every frame the client has sent so far
    pub fn drain_frames(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.from_client.try_recv() {
            frames.push(frame);
        }
        frames
    }

    /// Check whether the client has closed its side
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.to_client.is_closed()
    }
}

/// The client's view of one in-memory connection
struct MemoryTransport {
    incoming: mpsc::UnboundedReceiver<TransportEvent>,
    outgoing: Option<mpsc::UnboundedSender<String>>,
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        let outgoing = self.outgoing.as_ref().ok_or(TransportError::Closed)?;
        outgoing.send(text).map_err(|_| TransportError::Closed)
    }

    async fn recv(&mut self) -> TransportEvent {
        self.incoming.recv().await.unwrap_or(TransportEvent::Closed {
            code: None,
            reason: String::new(),
        })
    }

    async fn close(&mut self) {
        self.outgoing = None;
        self.incoming.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("ws://localhost:8001/ws/workspace/w1?token=t").unwrap()
    }

    #[tokio::test]
    async fn test_frames_flow_both_ways() {
        let (connector, mut server) = memory_pair();
        let mut transport = connector.connect(&url()).await.unwrap();
        let mut peer = server.accept().await.unwrap();

        transport.send("hello".to_string()).await.unwrap();
        assert_eq!(peer.next_frame().await.as_deref(), Some("hello"));

        peer.send_frame("world");
        assert!(matches!(transport.recv().await, TransportEvent::Frame(f) if f == "world"));

        peer.close(Some(4001));
        assert!(matches!(transport.recv().await, TransportEvent::Closed { code: Some(4001), .. }));
    }

    #[tokio::test]
    async fn test_scripted_refusal() {
        let (connector, server) = memory_pair();
        server.refuse_next(1);

        assert!(matches!(connector.connect(&url()).await, Err(TransportError::Refused(_))));
        assert!(connector.connect(&url()).await.is_ok());
        assert_eq!(server.attempts(), 2);
        assert_eq!(server.urls().len(), 2);
    }

    #[tokio::test]
    async fn test_dropped_peer_reads_as_close() {
        let (connector, mut server) = memory_pair();
        let mut transport = connector.connect(&url()).await.unwrap();
        drop(server.accept().await);

        assert!(matches!(transport.recv().await, TransportEvent::Closed { code: None, .. }));
    }

    #[tokio::test]
    async fn test_client_close_is_visible_to_peer() {
        let (connector, mut server) = memory_pair();
        let mut transport = connector.connect(&url()).await.unwrap();
        let mut peer = server.accept().await.unwrap();

        transport.close().await;
        assert!(peer.is_closed());
        assert!(peer.next_frame().await.is_none());
        assert!(transport.send("late".to_string()).await.is_err());
    }
}
