//! Metric router - Fan-in, tag rules, interval stamping, fan-out
//!
//! The `MetricRouter` merges points from any number of input channels, runs
//! each point through the configured tag rules, optionally overwrites its
//! timestamp with the shared interval timestamp, and broadcasts it to every
//! output channel.
//!
//! # Lifecycle
//!
//! ```text
//!  Idle ──start()──→ Running ──close()──→ Stopped
//!   │                                        ↑
//!   └── add_input() / add_output()           └── terminal, never reused
//! ```
//!
//! `start` spawns the routing loop (and the timer task, if interval stamping
//! is on) on the caller's `TaskTracker`. `close` cancels them without
//! waiting; callers observe full exit through `TaskTracker::wait`.

use std::future::poll_fn;
use std::path::Path;
use std::sync::Arc;
use std::task::{Context, Poll};

use ccm_config::{RouterConfig, WILDCARD_CONDITION};
use ccm_protocol::{Point, Timestamp};
use ccm_ticker::Ticker;
use ccm_transform::{EvalResult, Evaluator, TagRules};
use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::error::{PipelineError, Result};
use crate::metrics::{MetricsSnapshot, RouterMetrics};
use crate::output_handle::OutputHandle;
use crate::timestamp::{SharedTimestamp, follow_ticks};

/// Router lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    /// Constructed, accepting registrations
    Idle,
    /// Routing loop running
    Running,
    /// Shut down; terminal
    Stopped,
}

/// Handle for reading router metrics
///
/// Remains valid after the routing loop has taken over the router's
/// channels, and after it exits.
#[derive(Debug, Clone)]
pub struct RouterMetricsHandle {
    metrics: Arc<RouterMetrics>,
}

impl RouterMetricsHandle {
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Registered input channel
struct Input {
    id: usize,
    receiver: mpsc::Receiver<Point>,
}

/// Fan-in / fan-out router for metric points
///
/// # Example
///
/// ```ignore
/// let ticker = Arc::new(MultiChanTicker::new(Duration::from_secs(10)));
/// let tracker = TaskTracker::new();
/// let mut router = MetricRouter::init(ticker, tracker.clone(), "router.json")?;
///
/// let (collector_tx, collector_rx) = mpsc::channel(1000);
/// router.add_input(collector_rx)?;
///
/// let (sink_tx, sink_rx) = mpsc::channel(1000);
/// router.add_output(sink_tx)?;
///
/// router.start()?;
/// // collectors send Point on collector_tx, sinks receive Arc<Point> on sink_rx
///
/// router.close()?;
/// tracker.close();
/// tracker.wait().await;
/// ```
pub struct MetricRouter {
    config: RouterConfig,
    rules: Arc<TagRules>,
    ticker: Arc<dyn Ticker>,
    tracker: TaskTracker,
    cancel: CancellationToken,
    timestamp: Arc<SharedTimestamp>,
    metrics: Arc<RouterMetrics>,

    /// Registered channels; moved into the routing loop by `start`
    inputs: Vec<Input>,
    outputs: Vec<OutputHandle>,

    input_count: usize,
    output_count: usize,
    state: RouterState,
}

impl MetricRouter {
    /// Load configuration from `path` and build an idle router
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Config` if the file cannot be read, parsed or
    /// validated. The router is not created in that case.
    pub fn init(
        ticker: Arc<dyn Ticker>,
        tracker: TaskTracker,
        path: impl AsRef<Path>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let config = RouterConfig::from_file(path)?;

        tracing::info!(
            path = %path.display(),
            add_tags = config.add_tags.len(),
            delete_tags = config.delete_tags.len(),
            interval_timestamp = config.interval_timestamp,
            "router configuration loaded"
        );

        Ok(Self::new(config, ticker, tracker))
    }

    /// Build an idle router from an in-memory configuration
    pub fn new(config: RouterConfig, ticker: Arc<dyn Ticker>, tracker: TaskTracker) -> Self {
        let rules = Arc::new(TagRules::from_config(&config));

        Self {
            config,
            rules,
            ticker,
            tracker,
            cancel: CancellationToken::new(),
            timestamp: Arc::new(SharedTimestamp::new(Utc::now())),
            metrics: Arc::new(RouterMetrics::new()),
            inputs: Vec::new(),
            outputs: Vec::new(),
            input_count: 0,
            output_count: 0,
            state: RouterState::Idle,
        }
    }

    /// Replace the condition evaluator used by the tag rules
    pub fn with_evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.rules = Arc::new(TagRules::with_evaluator(&self.config, evaluator));
        self
    }

    /// Register an input channel
    ///
    /// # Errors
    ///
    /// Registration is frozen once the router has started.
    pub fn add_input(&mut self, receiver: mpsc::Receiver<Point>) -> Result<()> {
        self.ensure_idle("add_input")?;

        let id = self.input_count;
        self.inputs.push(Input { id, receiver });
        self.input_count += 1;

        tracing::debug!(input_id = id, "registered input with router");
        Ok(())
    }

    /// Register an output channel named after its registration index
    pub fn add_output(&mut self, sender: mpsc::Sender<Arc<Point>>) -> Result<()> {
        let name = format!("output-{}", self.output_count);
        self.add_named_output(name, sender)
    }

    /// Register an output channel with a name used in logs
    ///
    /// # Errors
    ///
    /// Registration is frozen once the router has started.
    pub fn add_named_output(
        &mut self,
        name: impl Into<String>,
        sender: mpsc::Sender<Arc<Point>>,
    ) -> Result<()> {
        self.ensure_idle("add_output")?;

        let handle = OutputHandle::new(self.output_count, name, sender);
        tracing::debug!(
            output_id = handle.id(),
            output_name = %handle.name(),
            "registered output with router"
        );

        self.outputs.push(handle);
        self.output_count += 1;
        Ok(())
    }

    /// Start routing
    ///
    /// Captures the start timestamp, subscribes to the ticker if interval
    /// stamping is enabled, and spawns the routing loop on the tracker.
    /// Returns immediately.
    ///
    /// # Errors
    ///
    /// `AlreadyStarted` on a running router, `AlreadyClosed` on a stopped
    /// one. State is left unchanged.
    pub fn start(&mut self) -> Result<()> {
        self.ensure_idle("start")?;

        let started_at = Utc::now();
        self.timestamp.store(started_at);

        let interval_timestamp = if self.config.interval_timestamp {
            // A tick the timer task has not read yet is replaced by a newer one
            let (tx, rx) = watch::channel(started_at);
            self.ticker.add_channel(tx);
            self.tracker.spawn(follow_ticks(
                rx,
                Arc::clone(&self.timestamp),
                self.cancel.clone(),
            ));
            Some(Arc::clone(&self.timestamp))
        } else {
            None
        };

        let routing = RoutingLoop {
            inputs: std::mem::take(&mut self.inputs),
            outputs: std::mem::take(&mut self.outputs),
            rules: Arc::clone(&self.rules),
            interval_timestamp,
            metrics: Arc::clone(&self.metrics),
            cancel: self.cancel.clone(),
            cursor: 0,
        };
        self.tracker.spawn(routing.run());

        self.state = RouterState::Running;
        Ok(())
    }

    /// Signal the routing loop to stop
    ///
    /// Does not wait for the loop to exit; use the tracker for that.
    ///
    /// # Errors
    ///
    /// `NotStarted` before `start`, `AlreadyClosed` on a second call. State
    /// is left unchanged.
    pub fn close(&mut self) -> Result<()> {
        match self.state {
            RouterState::Running => {
                self.cancel.cancel();
                self.state = RouterState::Stopped;
                tracing::info!("router close requested");
                Ok(())
            }
            RouterState::Idle => Err(self.misuse("close", PipelineError::NotStarted)),
            RouterState::Stopped => Err(self.misuse("close", PipelineError::AlreadyClosed)),
        }
    }

    /// Evaluate a rule condition against a point
    ///
    /// The wildcard always matches. Expression errors are returned rather
    /// than treated as "no match".
    pub fn eval_condition(&self, condition: &str, point: &Point) -> EvalResult<bool> {
        if condition == WILDCARD_CONDITION {
            return Ok(true);
        }
        self.rules.eval_condition(condition, point)
    }

    #[inline]
    pub fn state(&self) -> RouterState {
        self.state
    }

    #[inline]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Inputs registered so far
    #[inline]
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Outputs registered so far
    #[inline]
    pub fn output_count(&self) -> usize {
        self.output_count
    }

    /// The timestamp applied to points when interval stamping is enabled
    #[inline]
    pub fn current_timestamp(&self) -> Timestamp {
        self.timestamp.load()
    }

    pub fn metrics_handle(&self) -> RouterMetricsHandle {
        RouterMetricsHandle {
            metrics: Arc::clone(&self.metrics),
        }
    }

    fn ensure_idle(&self, operation: &'static str) -> Result<()> {
        match self.state {
            RouterState::Idle => Ok(()),
            RouterState::Running => Err(self.misuse(operation, PipelineError::AlreadyStarted)),
            RouterState::Stopped => Err(self.misuse(operation, PipelineError::AlreadyClosed)),
        }
    }

    fn misuse(&self, operation: &'static str, error: PipelineError) -> PipelineError {
        tracing::warn!(
            operation,
            state = ?self.state,
            error = %error,
            "router lifecycle call out of order, ignored"
        );
        error
    }
}

impl Drop for MetricRouter {
    fn drop(&mut self) {
        if self.state == RouterState::Running {
            tracing::debug!("running router dropped, stopping routing loop");
            self.cancel.cancel();
        }
    }
}

impl std::fmt::Debug for MetricRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricRouter")
            .field("state", &self.state)
            .field("input_count", &self.input_count)
            .field("output_count", &self.output_count)
            .field("rules", &self.config.rule_count())
            .field("interval_timestamp", &self.config.interval_timestamp)
            .finish()
    }
}

/// What one wait on the inputs produced
enum Received {
    Point(usize, Point),
    Closed(usize),
}

/// State owned by the spawned routing task
struct RoutingLoop {
    inputs: Vec<Input>,
    outputs: Vec<OutputHandle>,
    rules: Arc<TagRules>,
    interval_timestamp: Option<Arc<SharedTimestamp>>,
    metrics: Arc<RouterMetrics>,
    cancel: CancellationToken,

    /// Input index the next scan starts at
    cursor: usize,
}

impl RoutingLoop {
    async fn run(mut self) {
        tracing::info!(
            input_count = self.inputs.len(),
            output_count = self.outputs.len(),
            add_rules = self.rules.add_rules().len(),
            delete_rules = self.rules.delete_rules().len(),
            interval_timestamp = self.interval_timestamp.is_some(),
            "router starting"
        );

        let cancel = self.cancel.clone();
        loop {
            let received = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                received = poll_fn(|cx| self.poll_inputs(cx)) => received,
            };

            match received {
                Received::Point(index, point) => {
                    self.cursor = index + 1;
                    self.route(point).await;
                }
                Received::Closed(index) => {
                    let input = self.inputs.remove(index);
                    self.cursor = index;
                    tracing::debug!(
                        input_id = input.id,
                        remaining = self.inputs.len(),
                        "input channel closed, removed from scan"
                    );
                    if self.inputs.is_empty() {
                        tracing::info!("all inputs closed, router idle until shutdown");
                    }
                }
            }
        }

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            points_received = snapshot.points_received,
            points_forwarded = snapshot.points_forwarded,
            points_undelivered = snapshot.points_undelivered,
            output_sends_success = snapshot.output_sends_success,
            output_sends_failed = snapshot.output_sends_failed,
            tags_added = snapshot.tags_added,
            tags_removed = snapshot.tags_removed,
            eval_errors = snapshot.eval_errors,
            "router shutting down"
        );
    }

    /// Round-robin poll over the open inputs, starting at the cursor
    ///
    /// Pending with no inputs at all, so the caller waits on cancellation
    /// alone.
    fn poll_inputs(&mut self, cx: &mut Context<'_>) -> Poll<Received> {
        let count = self.inputs.len();
        for offset in 0..count {
            let index = (self.cursor + offset) % count;
            match self.inputs[index].receiver.poll_recv(cx) {
                Poll::Ready(Some(point)) => return Poll::Ready(Received::Point(index, point)),
                Poll::Ready(None) => return Poll::Ready(Received::Closed(index)),
                Poll::Pending => {}
            }
        }
        Poll::Pending
    }

    /// Mutate, stamp and broadcast one point
    ///
    /// Sends wait for each output in turn. Outputs found closed are warned
    /// about once and dropped from the fan-out.
    async fn route(&mut self, mut point: Point) {
        self.metrics.record_received();

        let outcome = self.rules.apply(&mut point);
        self.metrics.record_mutation(&outcome);

        if let Some(timestamp) = &self.interval_timestamp {
            point.set_time(timestamp.load());
        }

        tracing::trace!(point = %point, "routing point");

        // Single allocation shared by every output
        let point = Arc::new(point);

        let mut delivered = 0;
        let mut index = 0;
        while index < self.outputs.len() {
            let output = &self.outputs[index];
            match output.send(Arc::clone(&point)).await {
                Ok(()) => {
                    self.metrics.record_output_send_success();
                    delivered += 1;
                    index += 1;
                }
                Err(_) => {
                    tracing::warn!(
                        output_id = output.id(),
                        output_name = %output.name(),
                        "output channel closed, removed from fan-out"
                    );
                    self.metrics.record_output_send_failed();
                    self.outputs.remove(index);
                }
            }
        }

        if delivered > 0 {
            self.metrics.record_forwarded();
        } else {
            self.metrics.record_undelivered();
        }
    }
}
