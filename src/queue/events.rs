use serde::Serialize;
use std::fmt;

/// How a call to [`TaskQueue::execute`](super::TaskQueue::execute) ended.
///
/// Listeners only ever see progress and failure snapshots; the outcome is
/// what lets a caller tell a finished drain from an aborted one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DrainOutcome {
    /// Every pending task ran successfully
    Completed { executed: usize },
    /// A task failed; its successors are still pending
    Failed {
        executed: usize,
        remaining: usize,
        error: String,
    },
    /// The abort signal fired before the next task started
    Aborted { executed: usize, remaining: usize },
}

impl DrainOutcome {
    /// Tasks that completed successfully during the drain
    pub fn executed(&self) -> usize {
        match self {
            Self::Completed { executed }
            | Self::Failed { executed, .. }
            | Self::Aborted { executed, .. } => *executed,
        }
    }

    /// Tasks left pending when the drain stopped
    pub fn remaining(&self) -> usize {
        match self {
            Self::Completed { .. } => 0,
            Self::Failed { remaining, .. } | Self::Aborted { remaining, .. } => *remaining,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

impl fmt::Display for DrainOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed { executed } => write!(f, "completed {} task(s)", executed),
            Self::Failed {
                executed,
                remaining,
                error,
            } => write!(
                f,
                "failed after {} task(s), {} pending: {}",
                executed, remaining, error
            ),
            Self::Aborted {
                executed,
                remaining,
            } => write!(
                f,
                "aborted after {} task(s), {} pending",
                executed, remaining
            ),
        }
    }
}
