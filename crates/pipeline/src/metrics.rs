//! Metric router counters
//!
//! Atomic counters for tracking router throughput and rule activity.
//! All operations use relaxed ordering.

use std::sync::atomic::{AtomicU64, Ordering};

use ccm_transform::MutationOutcome;

/// Counters for the metric router
///
/// Values are eventually consistent, not real-time. Safe to update and read
/// from multiple threads.
#[derive(Debug, Default)]
pub struct RouterMetrics {
    /// Points received from inputs
    points_received: AtomicU64,

    /// Points delivered to at least one output
    points_forwarded: AtomicU64,

    /// Points that reached no output (none registered or all closed)
    points_undelivered: AtomicU64,

    /// Individual output sends that succeeded
    output_sends_success: AtomicU64,

    /// Individual output sends that failed (output closed)
    output_sends_failed: AtomicU64,

    /// Add rules that matched
    tags_added: AtomicU64,

    /// Delete rules that removed a present tag
    tags_removed: AtomicU64,

    /// Rule conditions that failed to evaluate
    eval_errors: AtomicU64,
}

impl RouterMetrics {
    #[inline]
    pub const fn new() -> Self {
        Self {
            points_received: AtomicU64::new(0),
            points_forwarded: AtomicU64::new(0),
            points_undelivered: AtomicU64::new(0),
            output_sends_success: AtomicU64::new(0),
            output_sends_failed: AtomicU64::new(0),
            tags_added: AtomicU64::new(0),
            tags_removed: AtomicU64::new(0),
            eval_errors: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_received(&self) {
        self.points_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_forwarded(&self) {
        self.points_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_undelivered(&self) {
        self.points_undelivered.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_output_send_success(&self) {
        self.output_sends_success.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_output_send_failed(&self) {
        self.output_sends_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record what one tag mutation pass did
    #[inline]
    pub fn record_mutation(&self, outcome: &MutationOutcome) {
        if outcome.tags_added > 0 {
            self.tags_added.fetch_add(outcome.tags_added, Ordering::Relaxed);
        }
        if outcome.tags_removed > 0 {
            self.tags_removed.fetch_add(outcome.tags_removed, Ordering::Relaxed);
        }
        if outcome.eval_errors > 0 {
            self.eval_errors.fetch_add(outcome.eval_errors, Ordering::Relaxed);
        }
    }

    /// Point-in-time copy of all counters
    #[inline]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            points_received: self.points_received.load(Ordering::Relaxed),
            points_forwarded: self.points_forwarded.load(Ordering::Relaxed),
            points_undelivered: self.points_undelivered.load(Ordering::Relaxed),
            output_sends_success: self.output_sends_success.load(Ordering::Relaxed),
            output_sends_failed: self.output_sends_failed.load(Ordering::Relaxed),
            tags_added: self.tags_added.load(Ordering::Relaxed),
            tags_removed: self.tags_removed.load(Ordering::Relaxed),
            eval_errors: self.eval_errors.load(Ordering::Relaxed),
        }
    }

    #[inline]
    pub fn points_received(&self) -> u64 {
        self.points_received.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn points_forwarded(&self) -> u64 {
        self.points_forwarded.load(Ordering::Relaxed)
    }
}

/// Point-in-time snapshot of router metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub points_received: u64,
    pub points_forwarded: u64,
    pub points_undelivered: u64,
    pub output_sends_success: u64,
    pub output_sends_failed: u64,
    pub tags_added: u64,
    pub tags_removed: u64,
    pub eval_errors: u64,
}

impl MetricsSnapshot {
    /// Output send success rate (0.0 - 1.0)
    ///
    /// Returns None if no sends have been attempted.
    #[inline]
    pub fn output_success_rate(&self) -> Option<f64> {
        let total = self.output_sends_success + self.output_sends_failed;
        if total == 0 {
            None
        } else {
            Some(self.output_sends_success as f64 / total as f64)
        }
    }
}
