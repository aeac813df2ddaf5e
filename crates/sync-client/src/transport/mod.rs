//! Transport layer
//!
//! A `Connector` opens one `Transport` per connection attempt. The session
//! never reuses a transport after it closes.

#[cfg(any(test, feature = "test-util"))]
mod memory;
mod websocket;

#[cfg(any(test, feature = "test-util"))]
pub use memory::{memory_pair, MemoryConnector, MemoryPeer, MemoryServer};
pub use websocket::{WsConnector, WsTransport};

use async_trait::async_trait;
use std::time::Duration;
use tokio_tungstenite::tungstenite;
use url::Url;

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("WebSocket error: {0}")]
    WebSocket(Box<tungstenite::Error>),

    #[error("Connection timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection refused: {0}")]
    Refused(String),

    #[error("Connection closed")]
    Closed,
}

impl From<tungstenite::Error> for TransportError {
    fn from(err: tungstenite::Error) -> Self {
        match err {
            tungstenite::Error::Http(response) => {
                Self::Refused(format!("HTTP {}", response.status()))
            }
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                Self::Closed
            }
            other => Self::WebSocket(Box::new(other)),
        }
    }
}

/// Something the transport observed
#[derive(Debug)]
pub enum TransportEvent {
    /// One inbound text frame
    Frame(String),
    /// The connection closed; `code` is absent when no close frame arrived
    Closed { code: Option<u16>, reason: String },
    /// The connection failed
    Error(TransportError),
}

/// One bidirectional message-stream connection
#[async_trait]
pub trait Transport: Send {
    /// Send one text frame
    async fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Wait for the next event
    ///
    /// Must be cancel safe. After `Closed` or `Error` the transport is dead.
    async fn recv(&mut self) -> TransportEvent;

    /// Close the connection, ignoring failures
    async fn close(&mut self);
}

/// Opens transports to an endpoint
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &Url) -> Result<Box<dyn Transport>, TransportError>;
}
