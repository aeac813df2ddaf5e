//! Session state
//!
//! Connection state machine, outbound queue and heartbeat timer.

mod controller;
mod heartbeat;
mod queue;
mod state;

pub use controller::{Delivery, SessionController, Transition};
pub use heartbeat::{HeartbeatScheduler, HEARTBEAT_INTERVAL_MS};
pub use queue::OutboundQueue;
pub use state::ConnectionState;
