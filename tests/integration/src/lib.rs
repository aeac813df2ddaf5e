//! Integration test utilities for the sync client
//!
//! Runs a mock workspace server on a local port so the client can be driven
//! over real WebSockets.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
