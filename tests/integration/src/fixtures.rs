//! Server frames used across tests

use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique workspace ids
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Token the mock server rejects with close code 4001
pub const REJECTED_TOKEN: &str = "bad";

pub fn unique_workspace() -> String {
    format!("ws-{}", COUNTER.fetch_add(1, Ordering::SeqCst))
}

pub fn welcome() -> Value {
    json!({"type": "connected", "message": "Connected to workspace"})
}

pub fn presence_update(user_ids: &[&str]) -> Value {
    let users: Vec<Value> = user_ids
        .iter()
        .map(|user_id| {
            json!({
                "user_id": user_id,
                "joined_at": "2024-05-01T12:00:00",
                "status": "online",
                "last_activity": "2024-05-01T12:00:00"
            })
        })
        .collect();

    json!({"type": "presence_update", "users": users, "count": user_ids.len()})
}

pub fn contact_updated(contact_id: &str, name: &str, by: &str) -> Value {
    json!({
        "type": "contact_updated",
        "contact_id": contact_id,
        "changes": {"name": name},
        "updated_by": by,
        "updated_by_name": "Grace"
    })
}

pub fn typing(contact_id: &str, field: &str, user_id: &str, user_name: &str) -> Value {
    json!({
        "type": "typing",
        "contact_id": contact_id,
        "field": field,
        "is_typing": true,
        "user_id": user_id,
        "user_name": user_name
    })
}

pub fn server_error(message: &str) -> Value {
    json!({"type": "error", "message": message})
}
