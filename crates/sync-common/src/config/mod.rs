//! Configuration structs

mod sync_config;

pub use sync_config::{Environment, SyncConfig};
