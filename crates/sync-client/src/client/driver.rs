//! Session driver
//!
//! One task per session. It opens a fresh transport for every attempt, pumps
//! frames in both directions while connected, and waits out the reconnect
//! delay after an unexpected close.

use super::Shared;
use crate::protocol::{CloseCode, Codec, OutboundMessage};
use crate::session::{Delivery, HeartbeatScheduler};
use crate::transport::{Transport, TransportEvent};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, trace, warn};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionOutcome {
    /// The transport closed or failed on its own
    Closed,
    /// The session was stopped
    Shutdown,
}

/// Run the session until it is stopped, or until the first close when
/// auto-reconnect is off
pub(crate) async fn run(shared: Arc<Shared>, url: Url, mut shutdown: watch::Receiver<bool>) {
    loop {
        let attempt = tokio::select! {
            biased;
            () = wait_for_shutdown(&mut shutdown) => break,
            result = shared.connector.connect(&url) => result,
        };

        let outcome = match attempt {
            Ok(transport) => run_connection(&shared, transport, &mut shutdown).await,
            Err(e) => {
                warn!(error = %e, "Connection attempt failed");
                shared.callbacks.error(&e.to_string());
                let transition =
                    shared.controller.lock().on_connect_failed(shared.after_close_state());
                shared.report(transition);
                ConnectionOutcome::Closed
            }
        };

        if outcome == ConnectionOutcome::Shutdown
            || !shared.config.auto_reconnect
            || shared.controller.lock().is_stopped()
        {
            break;
        }

        let delay = shared.config.reconnect_interval();
        debug!(delay_ms = shared.config.reconnect_interval_ms, "Reconnect scheduled");

        tokio::select! {
            biased;
            () = wait_for_shutdown(&mut shutdown) => break,
            () = tokio::time::sleep(delay) => {}
        }

        let transition = shared.controller.lock().begin_connecting();
        if transition.is_none() {
            break;
        }
        shared.report(transition);
    }

    debug!("Session driver exited");
}

/// Serve one open transport until it closes or the session stops
async fn run_connection(
    shared: &Shared,
    mut transport: Box<dyn Transport>,
    shutdown: &mut watch::Receiver<bool>,
) -> ConnectionOutcome {
    let (writer, mut outbox) = mpsc::unbounded_channel();

    let opened = shared.controller.lock().on_open(writer);
    let Some((transition, flushed)) = opened else {
        transport.close().await;
        return ConnectionOutcome::Shutdown;
    };

    info!(flushed, "Connected to workspace");
    shared.report(Some(transition));

    let mut heartbeat = HeartbeatScheduler::start(shared.config.heartbeat_interval());
    let mut failed: Option<OutboundMessage> = None;

    loop {
        tokio::select! {
            biased;

            () = wait_for_shutdown(shutdown) => {
                transport.close().await;
                return ConnectionOutcome::Shutdown;
            }

            event = transport.recv() => match event {
                TransportEvent::Frame(text) => shared.handle_frame(&text),
                TransportEvent::Closed { code, reason } => {
                    log_close(shared, code, &reason);
                    break;
                }
                TransportEvent::Error(e) => {
                    warn!(error = %e, "Transport error");
                    shared.callbacks.error(&e.to_string());
                    break;
                }
            },

            Some(message) = outbox.recv() => match Codec::encode(&message) {
                Ok(text) => {
                    trace!(kind = message.kind(), "Sending frame");
                    if let Err(e) = transport.send(text).await {
                        warn!(error = %e, kind = message.kind(), "Send failed");
                        shared.callbacks.error(&e.to_string());
                        failed = Some(message);
                        break;
                    }
                }
                Err(e) => {
                    error!(
                        error = %e,
                        kind = message.kind(),
                        "Dropping message that cannot be encoded"
                    );
                }
            },

            () = heartbeat.tick() => {
                let sent = shared.controller.lock().enqueue_or_send(OutboundMessage::Ping);
                match sent {
                    Ok(Delivery::Sent) => trace!("Heartbeat ping"),
                    Ok(Delivery::Queued) => debug!("Heartbeat ping queued"),
                    Err(e) => debug!(error = %e, "Heartbeat ping rejected"),
                }
            }
        }
    }

    transport.close().await;

    let transition =
        shared.controller.lock().on_close(shared.after_close_state(), failed, &mut outbox);
    let stopped = transition.is_none();
    shared.report(transition);

    if stopped {
        ConnectionOutcome::Shutdown
    } else {
        ConnectionOutcome::Closed
    }
}

fn log_close(shared: &Shared, code: Option<u16>, reason: &str) {
    match code.and_then(CloseCode::from_u16) {
        Some(close) if close.is_rejection() => {
            warn!(code = %close, reason, "Server rejected the session");
            shared.callbacks.error(close.description());
        }
        _ => {
            let description = code.map(CloseCode::describe);
            info!(code = ?description, reason, "Connection closed");
        }
    }
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    // A dropped sender also means shut down
    let _ = shutdown.wait_for(|stopped| *stopped).await;
}
