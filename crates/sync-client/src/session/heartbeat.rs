//! Heartbeat scheduler
//!
//! Ticks once per interval while a connection is open. The first tick fires
//! one full interval after the connection opens, never immediately.

use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Default heartbeat interval in milliseconds
pub const HEARTBEAT_INTERVAL_MS: u64 = 30_000;

/// Shortest period the scheduler accepts
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Liveness ping timer for one connection
#[derive(Debug)]
pub struct HeartbeatScheduler {
    interval: Interval,
    period: Duration,
}

impl HeartbeatScheduler {
    /// Start a scheduler whose first tick is one `period` from now
    ///
    /// A zero period is raised to one millisecond.
    #[must_use]
    pub fn start(period: Duration) -> Self {
        let period = period.max(MIN_PERIOD);
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval, period }
    }

    /// Wait for the next tick
    ///
    /// Cancel safe.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Default for HeartbeatScheduler {
    fn default() -> Self {
        Self::start(Duration::from_millis(HEARTBEAT_INTERVAL_MS))
    }
}
