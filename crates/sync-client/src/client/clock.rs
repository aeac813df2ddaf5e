//! Runtime clock

use std::time::Instant;
use sync_core::Clock;

/// Clock that follows tokio's time, including paused test time
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}
