//! # sync-client
//!
//! Real-time workspace synchronization client: keeps one live connection to
//! a workspace server, tracks presence and typing, relays contact mutations
//! and survives network interruptions without losing outbound messages.

pub mod client;
pub mod events;
pub mod presence;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod typing;

// Re-export commonly used types at crate root
pub use client::{SessionCallbacks, SyncClient, SyncClientBuilder, TokioClock};
pub use events::{EventBroadcaster, EventKind, ListenerId, SyncEvent};
pub use protocol::{Codec, CodecError, Decoded, InboundMessage, MessageType, OutboundMessage};
pub use session::{ConnectionState, Delivery};
pub use transport::{Connector, Transport, TransportError, TransportEvent};
