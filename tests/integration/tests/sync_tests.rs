//! End-to-end tests against a mock workspace server over real WebSockets
//!
//! Run with: cargo test -p integration-tests --test sync_tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use integration_tests::{fixtures::*, wait_for_event, wait_for_state, MockServer};
use serde_json::json;
use sync_client::{ConnectionState, Delivery, EventKind, SyncClient, SyncEvent};

// ============================================================================
// Connection
// ============================================================================

#[tokio::test]
async fn test_connects_with_workspace_and_token() {
    let mut server = MockServer::start().await.unwrap();
    let workspace = unique_workspace();
    let client = SyncClient::new(server.config(&workspace, "token-1"));
    let (_id, mut events) = client.events().channel(None);

    client.start().unwrap();
    let peer = server.accept().await.unwrap();
    assert_eq!(peer.workspace_id, workspace);
    assert_eq!(peer.token, "token-1");

    let welcome = wait_for_event(&mut events, |e| e.kind() == EventKind::Welcome).await.unwrap();
    assert_eq!(
        welcome,
        SyncEvent::Welcome {
            message: "Connected to workspace".to_string()
        }
    );
    assert!(client.is_connected());

    client.shutdown().await;
}

#[tokio::test]
async fn test_queued_messages_flush_in_order() {
    let mut server = MockServer::start().await.unwrap();
    let client = SyncClient::new(server.config(&unique_workspace(), "token-1"));

    assert_eq!(client.send_typing("c1", "name", true).unwrap(), Delivery::Queued);
    assert_eq!(client.send_note_added("c1", "first note").unwrap(), Delivery::Queued);
    assert_eq!(client.send_contact_deleted("c2").unwrap(), Delivery::Queued);

    client.start().unwrap();
    let mut peer = server.accept().await.unwrap();

    assert_eq!(
        peer.next_json().await.unwrap(),
        json!({"type": "typing", "contact_id": "c1", "field": "name", "is_typing": true})
    );
    assert_eq!(
        peer.next_json().await.unwrap(),
        json!({"type": "note_added", "contact_id": "c1", "note": "first note"})
    );
    assert_eq!(
        peer.next_json().await.unwrap(),
        json!({"type": "contact_deleted", "contact_id": "c2"})
    );
    assert!(client.queued_messages().is_empty());

    client.shutdown().await;
}

// ============================================================================
// Inbound state
// ============================================================================

#[tokio::test]
async fn test_presence_and_mutations_reach_listeners() {
    let mut server = MockServer::start().await.unwrap();
    let client = SyncClient::new(server.config(&unique_workspace(), "token-1"));
    let (_id, mut events) = client.events().channel(None);

    client.start().unwrap();
    let peer = server.accept().await.unwrap();
    wait_for_state(&mut events, ConnectionState::Connected).await.unwrap();

    peer.send_json(&presence_update(&["user-1", "user-2"]));
    wait_for_event(&mut events, |e| e.kind() == EventKind::PresenceUpdated).await.unwrap();
    assert_eq!(client.current_roster().len(), 2);

    peer.send_json(&json!({"type": "some_future_type", "payload": 1}));
    peer.send_json(&contact_updated("c1", "Ada Lovelace", "user-2"));

    let event = wait_for_event(&mut events, |e| e.mutation().is_some()).await.unwrap();
    assert_eq!(event.kind(), EventKind::ContactUpdated);
    let (notice, actor) = event.mutation().unwrap();
    assert_eq!(notice.contact_id(), "c1");
    assert_eq!(actor.label(), "Grace");

    peer.send_json(&presence_update(&[]));
    wait_for_event(&mut events, |e| e.kind() == EventKind::PresenceUpdated).await.unwrap();
    assert!(client.current_roster().is_empty());
    assert!(client.is_connected());

    client.shutdown().await;
}

#[tokio::test]
async fn test_typing_indicator_expires() {
    let mut server = MockServer::start().await.unwrap();
    let config = server
        .config(&unique_workspace(), "token-1")
        .with_typing_timeout(Duration::from_millis(200));
    let client = SyncClient::new(config);
    let (_id, mut events) = client.events().channel(Some(EventKind::Typing));

    client.start().unwrap();
    let peer = server.accept().await.unwrap();

    peer.send_json(&typing("c1", "email", "user-2", "Grace"));
    wait_for_event(&mut events, |_| true).await.unwrap();
    assert_eq!(client.typing_label("c1", "email").as_deref(), Some("Grace is typing"));

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(client.typing_users_for("c1", "email").is_empty());
    assert!(client.typing_label("c1", "email").is_none());

    client.shutdown().await;
}

#[tokio::test]
async fn test_server_error_reaches_callback() {
    let mut server = MockServer::start().await.unwrap();
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    let client = SyncClient::builder(server.config(&unique_workspace(), "token-1"))
        .on_error(move |message| sink.lock().unwrap().push(message.to_string()))
        .build();
    let (_id, mut events) = client.events().channel(Some(EventKind::ServerError));

    client.start().unwrap();
    let peer = server.accept().await.unwrap();
    peer.send_json(&server_error("Unknown message type"));

    wait_for_event(&mut events, |_| true).await.unwrap();
    assert_eq!(*errors.lock().unwrap(), vec!["Unknown message type".to_string()]);
    assert!(client.is_connected());

    client.shutdown().await;
}

// ============================================================================
// Heartbeat
// ============================================================================

#[tokio::test]
async fn test_heartbeat_ping_is_sent() {
    let mut server = MockServer::start().await.unwrap();
    let config = server
        .config(&unique_workspace(), "token-1")
        .with_heartbeat_interval(Duration::from_millis(100));
    let client = SyncClient::new(config);

    client.start().unwrap();
    let mut peer = server.accept().await.unwrap();

    assert_eq!(peer.next_of_type("ping").await.unwrap(), json!({"type": "ping"}));

    client.shutdown().await;
}

// ============================================================================
// Reconnect and shutdown
// ============================================================================

#[tokio::test]
async fn test_reconnects_after_server_close() {
    let mut server = MockServer::start().await.unwrap();
    let connects = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&connects);
    let client = SyncClient::builder(server.config(&unique_workspace(), "token-1"))
        .on_connected(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build();
    let (_id, mut events) = client.events().channel(Some(EventKind::ConnectionChanged));

    client.start().unwrap();
    let peer = server.accept().await.unwrap();
    wait_for_state(&mut events, ConnectionState::Connected).await.unwrap();

    peer.close(1001);
    wait_for_state(&mut events, ConnectionState::Reconnecting).await.unwrap();
    client.send_contact_deleted("c9").unwrap();

    let mut peer = server.accept().await.unwrap();
    wait_for_state(&mut events, ConnectionState::Connected).await.unwrap();

    assert_eq!(
        peer.next_json().await.unwrap(),
        json!({"type": "contact_deleted", "contact_id": "c9"})
    );
    assert_eq!(connects.load(Ordering::SeqCst), 2);

    client.shutdown().await;
}

#[tokio::test]
async fn test_rejected_token_is_reported_and_retried() {
    let server = MockServer::start().await.unwrap();
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    let client = SyncClient::builder(server.config(&unique_workspace(), REJECTED_TOKEN))
        .on_error(move |message| sink.lock().unwrap().push(message.to_string()))
        .build();

    client.start().unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        while server.attempts() < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    assert!(errors.lock().unwrap().iter().any(|e| e == "Unauthorized"));
    assert_ne!(client.state(), ConnectionState::Connected);

    client.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_closes_socket_and_stops_retrying() {
    let mut server = MockServer::start().await.unwrap();
    let client = SyncClient::new(server.config(&unique_workspace(), "token-1"));

    client.start().unwrap();
    let mut peer = server.accept().await.unwrap();
    client.send_typing("c1", "name", true).unwrap();
    peer.next_of_type("typing").await.unwrap();

    client.shutdown().await;
    peer.wait_closed().await.unwrap();
    assert_eq!(client.state(), ConnectionState::Disconnected);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(server.attempts(), 1);
    assert!(client.send_typing("c1", "name", false).is_err());
}

#[tokio::test]
async fn test_no_reconnect_when_disabled() {
    let mut server = MockServer::start().await.unwrap();
    let config = server
        .config(&unique_workspace(), "token-1")
        .with_auto_reconnect(false);
    let client = SyncClient::new(config);
    let (_id, mut events) = client.events().channel(Some(EventKind::ConnectionChanged));

    client.start().unwrap();
    let peer = server.accept().await.unwrap();
    wait_for_state(&mut events, ConnectionState::Connected).await.unwrap();

    peer.close(1000);
    wait_for_state(&mut events, ConnectionState::Disconnected).await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(server.attempts(), 1);
}
