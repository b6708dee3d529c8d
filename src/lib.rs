//! sync-queue library
//!
//! A queue that drains asynchronous tasks one at a time, reporting progress
//! to listeners and honouring a cooperative abort signal between tasks.

pub mod app;
pub mod queue;
pub mod sync;
pub mod utils;

// Re-export main types for easier use
pub use queue::{DrainOutcome, TaskQueue};
pub use sync::{
    AbortFlag, AbortSignal, ChannelListener, LoggingListener, NeverAbort, NoopListener,
    ProgressListener, ProgressSnapshot, SyncState, SyncTask, TaskResult,
};
pub use utils::{QueueSettings, SyncQueueError};
