//! WebSocket transport over `tokio-tungstenite`

use super::{Connector, Transport, TransportError, TransportEvent};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens WebSocket connections with a connect timeout
#[derive(Debug, Clone)]
pub struct WsConnector {
    connect_timeout: Duration,
}

impl WsConnector {
    #[must_use]
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for WsConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &Url) -> Result<Box<dyn Transport>, TransportError> {
        debug!(host = ?url.host_str(), path = url.path(), "Opening WebSocket");

        let (stream, response) =
            tokio::time::timeout(self.connect_timeout, connect_async(url.as_str()))
                .await
                .map_err(|_| TransportError::Timeout(self.connect_timeout))??;

        debug!(status = %response.status(), "WebSocket handshake complete");
        Ok(Box::new(WsTransport { stream }))
    }
}

/// A live WebSocket connection
pub struct WsTransport {
    stream: WsStream,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn recv(&mut self) -> TransportEvent {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return TransportEvent::Frame(text),
                Some(Ok(Message::Binary(data))) => match String::from_utf8(data) {
                    Ok(text) => return TransportEvent::Frame(text),
                    Err(_) => trace!("Dropping non-UTF-8 binary frame"),
                },
                Some(Ok(Message::Close(frame))) => {
                    return match frame {
                        Some(frame) => TransportEvent::Closed {
                            code: Some(u16::from(frame.code)),
                            reason: frame.reason.into_owned(),
                        },
                        None => TransportEvent::Closed {
                            code: None,
                            reason: String::new(),
                        },
                    };
                }
                // Pings are answered by tungstenite on the next write
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Err(e)) => return TransportEvent::Error(e.into()),
                None => {
                    return TransportEvent::Closed {
                        code: None,
                        reason: String::new(),
                    }
                }
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            trace!(error = %e, "Close handshake failed");
        }
    }
}
