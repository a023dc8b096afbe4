//! Output handle for router fan-out
//!
//! `OutputHandle` wraps a channel sender with an identifier and a name, so
//! the router can deliver points and log about an output without knowing
//! what consumes it.

use std::sync::Arc;

use ccm_protocol::Point;
use tokio::sync::mpsc;

/// Handle to one registered output
///
/// Carries `Arc<Point>` so a single allocation is shared by every output.
pub struct OutputHandle {
    /// Registration index
    id: usize,

    /// Human-readable name for logging
    name: String,

    /// Channel sender for points
    sender: mpsc::Sender<Arc<Point>>,
}

impl OutputHandle {
    #[inline]
    pub fn new(id: usize, name: impl Into<String>, sender: mpsc::Sender<Arc<Point>>) -> Self {
        Self {
            id,
            name: name.into(),
            sender,
        }
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send a point, waiting if the channel is full
    ///
    /// Returns the point back if the channel is closed.
    #[inline]
    pub async fn send(&self, point: Arc<Point>) -> Result<(), Arc<Point>> {
        self.sender.send(point).await.map_err(|e| e.0)
    }

    /// Check if the consumer has gone away
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Free slots in the channel
    #[inline]
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }
}

impl std::fmt::Debug for OutputHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_output_handle_creation() {
        let (tx, _rx) = mpsc::channel::<Arc<Point>>(10);
        let handle = OutputHandle::new(5, "influx", tx);

        assert_eq!(handle.id(), 5);
        assert_eq!(handle.name(), "influx");
        assert!(!handle.is_closed());
        assert_eq!(handle.capacity(), 10);
    }

    #[test]
    fn test_output_handle_debug() {
        let (tx, _rx) = mpsc::channel::<Arc<Point>>(10);
        let handle = OutputHandle::new(1, "debug_output", tx);

        let debug = format!("{:?}", handle);
        assert!(debug.contains("debug_output"));
        assert!(debug.contains("OutputHandle"));
    }

    #[tokio::test]
    async fn test_output_handle_send() {
        let (tx, mut rx) = mpsc::channel::<Arc<Point>>(1);
        let handle = OutputHandle::new(0, "test", tx);
        let point = Arc::new(Point::new("cpu", Utc::now()));

        handle.send(Arc::clone(&point)).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert!(Arc::ptr_eq(&point, &received));
    }

    #[tokio::test]
    async fn test_output_handle_send_closed() {
        let (tx, rx) = mpsc::channel::<Arc<Point>>(1);
        let handle = OutputHandle::new(0, "test", tx);
        drop(rx);

        assert!(handle.is_closed());
        let point = Arc::new(Point::new("cpu", Utc::now()));
        let returned = handle.send(Arc::clone(&point)).await.unwrap_err();
        assert!(Arc::ptr_eq(&point, &returned));
    }
}
