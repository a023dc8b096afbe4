//! Pipeline error types
//!
//! Errors surfaced by router setup and lifecycle calls. Nothing in the
//! routing loop itself returns an error: evaluation failures and closed
//! outputs are logged and counted instead.

use ccm_config::ConfigError;
use thiserror::Error;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Router configuration could not be loaded
    #[error("router configuration: {0}")]
    Config(#[from] ConfigError),

    /// `start` was called on a running router, or a channel was registered
    /// after `start`
    #[error("router already started")]
    AlreadyStarted,

    /// `close` was called before `start`
    #[error("router not started")]
    NotStarted,

    /// The router was already closed and cannot be reused
    #[error("router already closed")]
    AlreadyClosed,
}

impl PipelineError {
    /// Whether this error is a lifecycle call made out of order
    pub fn is_protocol_misuse(&self) -> bool {
        matches!(
            self,
            Self::AlreadyStarted | Self::NotStarted | Self::AlreadyClosed
        )
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
