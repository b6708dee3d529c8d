//! Cooperative cancellation signals
//!
//! The queue polls an [`AbortSignal`] once per iteration, before the next task
//! starts. A task that is already running is never interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Read-only cancellation flag owned by code outside the queue
pub trait AbortSignal: Send + Sync {
    fn is_aborted(&self) -> bool;
}

/// Shared boolean flag that can be flipped from any thread
#[derive(Debug, Clone, Default)]
pub struct AbortFlag {
    aborted: Arc<AtomicBool>,
}

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the next drain iteration stops
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    /// Clear a previous abort so the queue can be drained again
    pub fn reset(&self) {
        self.aborted.store(false, Ordering::SeqCst);
    }
}

impl AbortSignal for AbortFlag {
    fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

/// Signal that never fires
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverAbort;

impl AbortSignal for NeverAbort {
    fn is_aborted(&self) -> bool {
        false
    }
}

impl AbortSignal for AtomicBool {
    fn is_aborted(&self) -> bool {
        self.load(Ordering::SeqCst)
    }
}

impl AbortSignal for CancellationToken {
    fn is_aborted(&self) -> bool {
        self.is_cancelled()
    }
}

impl<T: AbortSignal + ?Sized> AbortSignal for Arc<T> {
    fn is_aborted(&self) -> bool {
        (**self).is_aborted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abort_flag_is_shared_between_clones() {
        let flag = AbortFlag::new();
        let observer = flag.clone();
        assert!(!observer.is_aborted());

        flag.abort();
        assert!(observer.is_aborted());

        flag.reset();
        assert!(!observer.is_aborted());
    }

    #[test]
    fn test_cancellation_token_signal() {
        let token = CancellationToken::new();
        let child = token.child_token();
        assert!(!child.is_aborted());

        token.cancel();
        assert!(token.is_aborted());
        assert!(child.is_aborted());
    }

    #[test]
    fn test_never_abort() {
        assert!(!NeverAbort.is_aborted());
    }

    #[test]
    fn test_atomic_bool_through_arc() {
        let flag = Arc::new(AtomicBool::new(false));
        let signal: Arc<dyn AbortSignal> = flag.clone();
        flag.store(true, Ordering::SeqCst);
        assert!(signal.is_aborted());
    }
}
