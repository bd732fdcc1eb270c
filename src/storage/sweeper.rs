use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::EntryStore;

/// Periodic TTL eviction.
///
/// Each sweep takes the same store lock as the request paths; a sweep in
/// progress finishes its scan-and-remove before the next tick runs.
/// Eviction is silent to callers: an evicted entry is indistinguishable
/// from one that never existed.
pub struct Sweeper {
    store: Arc<EntryStore>,
    ttl: Duration,
    period: Duration,
}

impl Sweeper {
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

    pub fn new(store: Arc<EntryStore>, ttl: Duration) -> Self {
        Self::with_period(store, ttl, Self::DEFAULT_PERIOD)
    }

    /// The period is parameterized so tests can sweep faster than the
    /// production once-per-second cadence.
    pub fn with_period(store: Arc<EntryStore>, ttl: Duration, period: Duration) -> Self {
        Self { store, ttl, period }
    }

    /// Run the sweep loop for the lifetime of the process.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(self.period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tick.tick().await;
                self.sweep().await;
            }
        })
    }

    /// One scan-and-remove cycle over a snapshot of the store.
    pub async fn sweep(&self) {
        let threshold = Utc::now() - self.ttl;
        for id in self.store.evict_older_than(threshold).await {
            debug!(%id, "evicted expired entry");
        }
    }
}
