//! Multi-channel ticker

use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{Tick, Ticker};

#[cfg(test)]
#[path = "multi_chan_test.rs"]
mod tests;

/// Smallest interval a ticker will run at
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Ticker that broadcasts each tick to every registered channel
pub struct MultiChanTicker {
    interval: Duration,
    channels: Mutex<Vec<watch::Sender<Tick>>>,
}

impl MultiChanTicker {
    /// Create a ticker; intervals below [`MIN_INTERVAL`] are raised to it
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_INTERVAL),
            channels: Mutex::new(Vec::new()),
        }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of live subscriber channels
    pub fn channel_count(&self) -> usize {
        self.channels.lock().len()
    }

    /// Deliver one tick to every subscriber
    ///
    /// The tick replaces any value a subscriber has not read yet. Closed
    /// channels are removed. Returns the number of channels the tick was
    /// delivered to.
    pub fn tick(&self, now: Tick) -> usize {
        let mut channels = self.channels.lock();

        channels.retain(|tx| {
            if tx.is_closed() {
                tracing::debug!("ticker subscriber closed, removing");
                return false;
            }
            tx.send_replace(now);
            true
        });

        channels.len()
    }

    /// Tick until cancelled
    ///
    /// The first tick fires one interval after the call. Missed ticks are
    /// skipped rather than delivered in a burst.
    pub async fn run(&self, cancel: CancellationToken) {
        let start = tokio::time::Instant::now() + self.interval;
        let mut ticker = tokio::time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            channels = self.channel_count(),
            "ticker started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("ticker shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.tick(Utc::now());
                }
            }
        }
    }
}

impl Ticker for MultiChanTicker {
    fn add_channel(&self, sender: watch::Sender<Tick>) {
        self.channels.lock().push(sender);
    }
}

impl std::fmt::Debug for MultiChanTicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiChanTicker")
            .field("interval", &self.interval)
            .field("channels", &self.channel_count())
            .finish()
    }
}
