//! Rate-limited warning logging
//!
//! A broken rule condition fails on every point it sees. Logging each failure
//! would flood the log on the routing hot path, so failures are logged at
//! most once per interval with a count of the suppressed ones.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default interval between log lines
pub const DEFAULT_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Rate-limited logger
///
/// Thread-safe: atomic counters plus a mutex around the last log time.
pub struct RateLimitedLogger {
    /// Minimum interval between log messages
    min_interval: Duration,

    /// Last time we logged
    last_log_time: Mutex<Option<Instant>>,

    /// Count of failures since last log
    pending: AtomicU64,

    /// Total failures ever recorded
    total: AtomicU64,
}

impl RateLimitedLogger {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_log_time: Mutex::new(None),
            pending: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    /// Logger with the default 10 second interval
    pub fn default_interval() -> Self {
        Self::new(DEFAULT_LOG_INTERVAL)
    }

    /// Record a failed condition and log if enough time has passed
    ///
    /// Returns true if a line was logged, false if it was suppressed.
    pub fn warn(&self, condition: &str, error: &dyn std::fmt::Display) -> bool {
        self.pending.fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed);

        let should_log = {
            let mut last_time = self.last_log_time.lock();
            let now = Instant::now();

            match *last_time {
                Some(last) if now.duration_since(last) < self.min_interval => false,
                _ => {
                    *last_time = Some(now);
                    true
                }
            }
        };

        if !should_log {
            return false;
        }

        let count = self.pending.swap(0, Ordering::Relaxed);
        let total = self.total.load(Ordering::Relaxed);

        if count > 1 {
            tracing::warn!(
                condition = %condition,
                error = %error,
                suppressed_count = count - 1,
                total_errors = total,
                "condition evaluation failed, rule skipped (rate-limited)"
            );
        } else {
            tracing::warn!(
                condition = %condition,
                error = %error,
                total_errors = total,
                "condition evaluation failed, rule skipped"
            );
        }
        true
    }

    /// Total failures recorded
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for RateLimitedLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitedLogger")
            .field("min_interval", &self.min_interval)
            .field("total", &self.total())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_failure_is_logged() {
        let logger = RateLimitedLogger::new(Duration::from_secs(60));
        assert!(logger.warn("a > 1", &"boom"));
        assert_eq!(logger.total(), 1);
    }

    #[test]
    fn test_repeated_failures_are_suppressed() {
        let logger = RateLimitedLogger::new(Duration::from_secs(60));
        assert!(logger.warn("a > 1", &"boom"));
        assert!(!logger.warn("a > 1", &"boom"));
        assert!(!logger.warn("a > 1", &"boom"));
        assert_eq!(logger.total(), 3);
    }

    #[test]
    fn test_zero_interval_logs_every_time() {
        let logger = RateLimitedLogger::new(Duration::ZERO);
        assert!(logger.warn("a", &"x"));
        assert!(logger.warn("a", &"x"));
    }
}
