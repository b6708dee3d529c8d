//! Building blocks consumed by the task queue

pub mod abort;
pub mod listener;
pub mod progress;
pub mod task;

pub use abort::{AbortFlag, AbortSignal, NeverAbort};
pub use listener::{ChannelListener, LoggingListener, NoopListener, ProgressListener};
pub use progress::{percentages, ProgressSnapshot, SyncState};
pub use task::{SyncTask, TaskResult};
