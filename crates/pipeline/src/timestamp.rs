//! Shared interval timestamp
//!
//! The router's "current timestamp" is written by the timer task on every
//! tick and read by the routing loop for every point. It is kept as Unix
//! nanoseconds in an atomic so neither side ever waits on the other.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use ccm_protocol::Timestamp;
use ccm_ticker::Tick;
use chrono::{TimeZone, Utc};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Lock-free timestamp cell
///
/// Last write wins. Instants outside the nanosecond range (before 1677 or
/// after 2262) are clamped to its bounds.
#[derive(Debug)]
pub struct SharedTimestamp {
    nanos: AtomicI64,
}

impl SharedTimestamp {
    pub fn new(time: Timestamp) -> Self {
        Self {
            nanos: AtomicI64::new(to_nanos(time)),
        }
    }

    #[inline]
    pub fn store(&self, time: Timestamp) {
        self.nanos.store(to_nanos(time), Ordering::Release);
    }

    #[inline]
    pub fn load(&self) -> Timestamp {
        Utc.timestamp_nanos(self.nanos.load(Ordering::Acquire))
    }
}

fn to_nanos(time: Timestamp) -> i64 {
    time.timestamp_nanos_opt().unwrap_or(if time.timestamp() < 0 {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Copy the latest tick into `timestamp` until cancelled or the ticker goes away
pub(crate) async fn follow_ticks(
    mut ticks: watch::Receiver<Tick>,
    timestamp: Arc<SharedTimestamp>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            changed = ticks.changed() => match changed {
                Ok(()) => {
                    let time = *ticks.borrow_and_update();
                    timestamp.store(time);
                    tracing::trace!(%time, "interval timestamp updated");
                }
                Err(_) => {
                    tracing::warn!("ticker channel closed, interval timestamp frozen");
                    break;
                }
            },
        }
    }
    tracing::debug!("interval timestamp task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(secs: i64, nanos: u32) -> Timestamp {
        Utc.timestamp_opt(secs, nanos).single().unwrap()
    }

    #[test]
    fn test_store_and_load() {
        let cell = SharedTimestamp::new(at(1_700_000_000, 0));
        assert_eq!(cell.load(), at(1_700_000_000, 0));

        cell.store(at(1_700_000_010, 123_456_789));
        assert_eq!(cell.load(), at(1_700_000_010, 123_456_789));
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let far_future = at(20_000_000_000, 0);
        let cell = SharedTimestamp::new(far_future);
        assert_eq!(cell.load(), Utc.timestamp_nanos(i64::MAX));

        cell.store(at(-20_000_000_000, 0));
        assert_eq!(cell.load(), Utc.timestamp_nanos(i64::MIN));
    }

    #[tokio::test]
    async fn test_follow_ticks_updates_until_cancelled() {
        let cell = Arc::new(SharedTimestamp::new(at(0, 0)));
        let (tx, rx) = watch::channel(at(0, 0));
        let cancel = CancellationToken::new();
        let task = tokio::spawn(follow_ticks(rx, Arc::clone(&cell), cancel.clone()));

        let tick = at(1_700_000_000, 0);
        tx.send(tick).unwrap();

        tokio::time::timeout(Duration::from_secs(1), async {
            while cell.load() != tick {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("tick should be stored");

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("task should stop on cancel")
            .unwrap();
    }

    #[tokio::test]
    async fn test_follow_ticks_keeps_only_latest_unread_tick() {
        let cell = Arc::new(SharedTimestamp::new(at(0, 0)));
        let (tx, rx) = watch::channel(at(0, 0));

        // Both ticks land before the task ever polls
        tx.send_replace(at(1_700_000_000, 0));
        tx.send_replace(at(1_700_000_010, 0));

        let cancel = CancellationToken::new();
        let task = tokio::spawn(follow_ticks(rx, Arc::clone(&cell), cancel.clone()));

        tokio::time::timeout(Duration::from_secs(1), async {
            while cell.load() == at(0, 0) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("tick should be stored");
        assert_eq!(cell.load(), at(1_700_000_010, 0));

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_follow_ticks_stops_when_ticker_gone() {
        let cell = Arc::new(SharedTimestamp::new(at(5, 0)));
        let (tx, rx) = watch::channel(at(0, 0));
        drop(tx);

        tokio::time::timeout(
            Duration::from_secs(1),
            follow_ticks(rx, Arc::clone(&cell), CancellationToken::new()),
        )
        .await
        .expect("task should stop when the ticker channel closes");

        assert_eq!(cell.load(), at(5, 0));
    }
}
