//! Sync client
//!
//! The public handle plus the driver task that runs the session.

mod callbacks;
mod clock;
mod driver;
mod shared;
mod sync_client;

pub use callbacks::SessionCallbacks;
pub use clock::TokioClock;
pub use sync_client::{SyncClient, SyncClientBuilder};

use shared::Shared;
