//! CCM - Pipeline
//!
//! The metric router that connects collectors to sinks via channels.
//!
//! # Architecture
//!
//! ```text
//! [Collectors]                   [MetricRouter]                      [Sinks]
//!    infiniband ─┐                                               ┌──→ influx
//!    cpustat ────┼──→ mpsc::Receiver ──→ TagRules ──→ stamp ──→ Arc<Point> ──→ stdout
//!    memstat ────┘                                               └──→ ...
//! ```
//!
//! # Key Design
//!
//! - **Channel-based**: `tokio::sync::mpsc` in, `tokio::sync::mpsc` out
//! - **Arc fan-out**: Each point is wrapped in `Arc` once and shared by all outputs
//! - **Backpressure**: Blocking sends; a slow output slows the whole router
//! - **Fair fan-in**: Inputs are polled round-robin from the one after the last producer
//! - **Cooperative shutdown**: `CancellationToken` + `TaskTracker`
//!
//! # Example
//!
//! ```ignore
//! use ccm_pipeline::MetricRouter;
//! use ccm_ticker::MultiChanTicker;
//! use tokio_util::task::TaskTracker;
//!
//! let ticker = Arc::new(MultiChanTicker::new(Duration::from_secs(10)));
//! let tracker = TaskTracker::new();
//! let mut router = MetricRouter::init(ticker, tracker.clone(), "router.json")?;
//!
//! let (collector_tx, collector_rx) = mpsc::channel(DEFAULT_INPUT_CHANNEL_SIZE);
//! router.add_input(collector_rx)?;
//! let (sink_tx, sink_rx) = mpsc::channel(DEFAULT_OUTPUT_CHANNEL_SIZE);
//! router.add_output(sink_tx)?;
//!
//! router.start()?;
//! // ...
//! router.close()?;
//! tracker.close();
//! tracker.wait().await;
//! ```

mod error;
mod metrics;
mod output_handle;
mod router;
mod timestamp;

pub use error::{PipelineError, Result};
pub use metrics::{MetricsSnapshot, RouterMetrics};
pub use output_handle::OutputHandle;
pub use router::{MetricRouter, RouterMetricsHandle, RouterState};
pub use timestamp::SharedTimestamp;

// Re-export key types from dependencies for convenience
pub use ccm_config::{RouterConfig, TagRuleConfig};
pub use ccm_protocol::Point;
pub use ccm_ticker::{MultiChanTicker, Ticker};

/// Default channel buffer size for collector inputs
pub const DEFAULT_INPUT_CHANNEL_SIZE: usize = 1000;

/// Default channel buffer size for sink outputs
pub const DEFAULT_OUTPUT_CHANNEL_SIZE: usize = 1000;
