//! CCM - Ticker
//!
//! Fan-out clock for components that need to act on a shared interval.
//!
//! # Overview
//!
//! A ticker owns one interval and any number of subscriber channels. On
//! every interval boundary it delivers the current wall-clock time to each
//! subscriber:
//!
//! ```text
//!                        ┌──→ router timestamp
//! [interval] → Utc::now ─┼──→ collector scheduler
//!                        └──→ ...
//! ```
//!
//! Delivery never blocks. Each subscriber holds a `watch` channel, so a new
//! tick replaces one the subscriber has not read yet and a slow subscriber
//! always wakes up to the latest time. A subscriber whose receiver is gone
//! is dropped from the list.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use ccm_ticker::{MultiChanTicker, Ticker};
//! use chrono::Utc;
//! use tokio::sync::watch;
//! use tokio_util::sync::CancellationToken;
//!
//! let ticker = Arc::new(MultiChanTicker::new(Duration::from_secs(10)));
//! let (tx, mut rx) = watch::channel(Utc::now());
//! ticker.add_channel(tx);
//!
//! let cancel = CancellationToken::new();
//! tokio::spawn({
//!     let ticker = Arc::clone(&ticker);
//!     let cancel = cancel.clone();
//!     async move { ticker.run(cancel).await }
//! });
//!
//! rx.changed().await?;
//! let tick = *rx.borrow_and_update();
//! ```

mod multi_chan;

pub use multi_chan::{MIN_INTERVAL, MultiChanTicker};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

/// Time delivered on every interval boundary
pub type Tick = DateTime<Utc>;

/// Capability to subscribe a channel to periodic ticks
///
/// Channels stay registered until every receiver is dropped or the ticker
/// stops. Only the newest tick is kept per channel.
pub trait Ticker: Send + Sync {
    /// Register a channel to receive every subsequent tick
    fn add_channel(&self, sender: watch::Sender<Tick>);
}
