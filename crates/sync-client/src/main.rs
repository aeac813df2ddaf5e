//! Workspace sync client entry point
//!
//! Run with:
//! ```bash
//! SYNC_WORKSPACE_ID=... SYNC_USER_ID=... SYNC_TOKEN=... cargo run -p sync-client
//! ```
//!
//! Configuration is loaded from environment variables.

use anyhow::Context;
use sync_client::{SyncClient, SyncEvent};
use sync_common::{try_init_tracing_with_config, SyncConfig, TracingConfig};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Load configuration before tracing so the environment picks the log format
    let config = match SyncConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(&TracingConfig::for_environment(config.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run(config).await {
        error!(error = %e, "Sync client failed");
        std::process::exit(1);
    }
}

async fn run(config: SyncConfig) -> anyhow::Result<()> {
    info!(
        env = ?config.env,
        ws_url = %config.ws_url,
        workspace_id = %config.workspace_id,
        "Configuration loaded"
    );

    let client = SyncClient::builder(config)
        .on_connected(|| info!("Connected"))
        .on_disconnected(|| warn!("Disconnected"))
        .on_error(|reason| warn!(reason, "Session error"))
        .build();

    let (_listener, mut events) = client.events().channel(None);
    client.start().context("failed to start session")?;

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl-C")?;
                info!("Shutting down");
                break;
            }
            Some(event) = events.recv() => log_event(&event),
        }
    }

    client.shutdown().await;
    Ok(())
}

fn log_event(event: &SyncEvent) {
    match event {
        SyncEvent::ConnectionChanged { state } => info!(%state, "Connection state"),
        SyncEvent::Welcome { message } => info!(greeting = %message, "Welcome"),
        SyncEvent::PresenceUpdated { roster, count } => {
            let names: Vec<_> = roster.iter().map(|entry| entry.display_name()).collect();
            info!(count, users = ?names, "Presence");
        }
        SyncEvent::ContactMutated { notice, actor } => info!(
            kind = notice.kind(),
            contact_id = notice.contact_id(),
            by = actor.label(),
            "Contact changed"
        ),
        SyncEvent::Typing { contact_id, field, user_id, is_typing, .. } => {
            info!(%contact_id, %field, %user_id, is_typing, "Typing");
        }
        SyncEvent::CursorPosition { x, y, user_id, .. } => info!(x, y, %user_id, "Cursor"),
        SyncEvent::ServerError { message } => warn!(reason = %message, "Server error"),
    }
}
