//! Progress observers

use super::progress::ProgressSnapshot;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Anything that wants to observe drain progress.
///
/// Called synchronously by the queue, once per completed or failed task, in
/// completion order. Implementations should return quickly; slow consumers
/// should use a [`ChannelListener`] and process snapshots elsewhere.
pub trait ProgressListener: Send + Sync {
    fn on_progress(&self, snapshot: &ProgressSnapshot);
}

impl<F> ProgressListener for F
where
    F: Fn(&ProgressSnapshot) + Send + Sync,
{
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        self(snapshot)
    }
}

/// Listener that ignores every snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl ProgressListener for NoopListener {
    fn on_progress(&self, _snapshot: &ProgressSnapshot) {}
}

/// Forwards snapshots into an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelListener {
    sender: mpsc::UnboundedSender<ProgressSnapshot>,
}

impl ChannelListener {
    /// Create a listener together with the receiving end of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressSnapshot>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ProgressListener for ChannelListener {
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        if self.sender.send(snapshot.clone()).is_err() {
            // Receiver gone; nothing left to notify
            tracing::trace!("progress receiver dropped");
        }
    }
}

/// Emits each snapshot as a tracing event
#[derive(Debug, Clone)]
pub struct LoggingListener {
    name: String,
}

impl LoggingListener {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ProgressListener for LoggingListener {
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        match snapshot.error() {
            Some(e) => warn!(
                queue = %self.name,
                percentage = snapshot.percentage(),
                "Sync failed: {:#}",
                e
            ),
            None => info!(
                queue = %self.name,
                percentage = snapshot.percentage(),
                completed = snapshot.completed(),
                remaining = snapshot.remaining(),
                "Sync progress"
            ),
        }
    }
}
