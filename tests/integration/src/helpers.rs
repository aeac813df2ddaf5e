//! Test helpers for integration tests
//!
//! `MockServer` speaks the workspace protocol at `/ws/workspace/:workspace_id`.
//! Each accepted connection is handed to the test as a `MockPeer`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use sync_client::{ConnectionState, SyncEvent};
use sync_common::SyncConfig;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::fixtures::{welcome, REJECTED_TOKEN};

/// How long a test waits for anything before failing
pub const WAIT: Duration = Duration::from_secs(5);

/// Reconnect delay used by test clients
pub const TEST_RECONNECT: Duration = Duration::from_millis(50);

#[derive(Clone)]
struct MockState {
    accept_tx: mpsc::UnboundedSender<MockPeer>,
    attempts: Arc<AtomicUsize>,
}

/// Mock workspace server bound to a local port
pub struct MockServer {
    pub addr: SocketAddr,
    accept_rx: mpsc::UnboundedReceiver<MockPeer>,
    attempts: Arc<AtomicUsize>,
    _handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn start() -> Result<Self> {
        let (accept_tx, accept_rx) = mpsc::unbounded_channel();
        let attempts = Arc::new(AtomicUsize::new(0));

        let state = MockState {
            accept_tx,
            attempts: Arc::clone(&attempts),
        };
        let app = Router::new()
            .route("/ws/workspace/:workspace_id", get(workspace_handler))
            .with_state(state);

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            accept_rx,
            attempts,
            _handle: handle,
        })
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Client config pointed at this server
    pub fn config(&self, workspace_id: &str, token: &str) -> SyncConfig {
        SyncConfig::new(workspace_id, "user-1", token)
            .with_ws_url(self.ws_url())
            .with_reconnect_interval(TEST_RECONNECT)
    }

    /// Wait for the next accepted connection
    pub async fn accept(&mut self) -> Result<MockPeer> {
        tokio::time::timeout(WAIT, self.accept_rx.recv())
            .await
            .context("timed out waiting for a connection")?
            .context("server stopped")
    }

    /// Upgrade requests seen so far, rejected ones included
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

enum PeerCommand {
    Text(String),
    Close(u16),
}

/// The server side of one connection
pub struct MockPeer {
    pub workspace_id: String,
    pub token: String,
    commands: mpsc::UnboundedSender<PeerCommand>,
    frames: mpsc::UnboundedReceiver<String>,
}

impl MockPeer {
    pub fn send_json(&self, value: &Value) {
        let _ = self.commands.send(PeerCommand::Text(value.to_string()));
    }

    pub fn close(&self, code: u16) {
        let _ = self.commands.send(PeerCommand::Close(code));
    }

    /// Next frame the client sent, parsed as JSON
    pub async fn next_json(&mut self) -> Result<Value> {
        let text = tokio::time::timeout(WAIT, self.frames.recv())
            .await
            .context("timed out waiting for a frame")?
            .context("client closed the connection")?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Next frame of the given type, skipping others
    pub async fn next_of_type(&mut self, kind: &str) -> Result<Value> {
        loop {
            let frame = self.next_json().await?;
            if frame["type"] == kind {
                return Ok(frame);
            }
        }
    }

    /// Wait until the client closes its side
    pub async fn wait_closed(&mut self) -> Result<()> {
        tokio::time::timeout(WAIT, async {
            while self.frames.recv().await.is_some() {}
        })
        .await
        .context("client did not close the connection")
    }
}

async fn workspace_handler(
    State(state): State<MockState>,
    Path(workspace_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    state.attempts.fetch_add(1, Ordering::SeqCst);
    let token = params.get("token").cloned().unwrap_or_default();
    ws.on_upgrade(move |socket| handle_socket(state, socket, workspace_id, token))
}

async fn handle_socket(state: MockState, mut socket: WebSocket, workspace_id: String, token: String) {
    if token == REJECTED_TOKEN {
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: 4001,
                reason: "Invalid token".into(),
            })))
            .await;
        return;
    }

    if socket.send(Message::Text(welcome().to_string())).await.is_err() {
        return;
    }

    let (commands_tx, mut commands) = mpsc::unbounded_channel();
    let (frames_tx, frames) = mpsc::unbounded_channel();
    let peer = MockPeer {
        workspace_id,
        token,
        commands: commands_tx,
        frames,
    };
    if state.accept_tx.send(peer).is_err() {
        return;
    }

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(PeerCommand::Text(text)) => {
                    if sink.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Some(PeerCommand::Close(code)) => {
                    let frame = CloseFrame { code, reason: "".into() };
                    let _ = sink.send(Message::Close(Some(frame))).await;
                    break;
                }
                None => {
                    let _ = sink.close().await;
                    break;
                }
            },
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    let _ = frames_tx.send(text);
                }
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
}

/// Wait for the first event matching `predicate`
pub async fn wait_for_event(
    events: &mut mpsc::UnboundedReceiver<SyncEvent>,
    predicate: impl Fn(&SyncEvent) -> bool,
) -> Result<SyncEvent> {
    tokio::time::timeout(WAIT, async {
        while let Some(event) = events.recv().await {
            if predicate(&event) {
                return Some(event);
            }
        }
        None
    })
    .await
    .context("timed out waiting for an event")?
    .context("event channel closed")
}

/// Wait until the connection indicator reports `state`
pub async fn wait_for_state(
    events: &mut mpsc::UnboundedReceiver<SyncEvent>,
    state: ConnectionState,
) -> Result<()> {
    wait_for_event(events, |event| {
        matches!(event, SyncEvent::ConnectionChanged { state: s } if *s == state)
    })
    .await
    .map(|_| ())
}
