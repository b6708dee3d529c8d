//! Sequential task queue with progress reporting and cooperative abort

use super::events::DrainOutcome;
use crate::sync::{percentages, AbortSignal, ProgressListener, ProgressSnapshot, SyncTask};
use crate::utils::config::QueueSettings;
use crate::utils::error::{panic_message, SyncQueueError};
use futures::FutureExt;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};

/// A queue that accepts tasks at any time and drains them one at a time.
///
/// The usual pattern is to perform a step, `add` the work it produced, and
/// `execute` to drain it before moving on. Tasks run strictly in submission
/// order and never concurrently, even when `execute` is called from several
/// places at once.
pub struct TaskQueue {
    settings: QueueSettings,
    state: Mutex<QueueState>,
    drain_lock: Mutex<()>,
    abort: Arc<dyn AbortSignal>,
    listeners: RwLock<Vec<Arc<dyn ProgressListener>>>,
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<SyncTask>,
    /// Tasks submitted over the queue's lifetime
    submitted: usize,
    /// Non-empty `add` calls
    batches: usize,
}

impl TaskQueue {
    /// Create a queue with default settings
    pub fn new(
        abort: impl AbortSignal + 'static,
        listener: impl ProgressListener + 'static,
    ) -> Self {
        Self::with_settings(QueueSettings::default(), abort, listener)
    }

    pub fn with_settings(
        settings: QueueSettings,
        abort: impl AbortSignal + 'static,
        listener: impl ProgressListener + 'static,
    ) -> Self {
        let listener: Arc<dyn ProgressListener> = Arc::new(listener);
        Self {
            settings,
            state: Mutex::new(QueueState::default()),
            drain_lock: Mutex::new(()),
            abort: Arc::new(abort),
            listeners: RwLock::new(vec![listener]),
        }
    }

    pub fn settings(&self) -> &QueueSettings {
        &self.settings
    }

    /// Register another observer. It receives every snapshot published from now on.
    pub async fn subscribe(&self, listener: impl ProgressListener + 'static) {
        self.listeners.write().await.push(Arc::new(listener));
    }

    /// Append tasks, in the order given, to the end of the pending sequence
    pub async fn add(&self, tasks: impl IntoIterator<Item = SyncTask>) {
        let mut state = self.state.lock().await;
        let before = state.pending.len();
        state.pending.extend(tasks);

        let added = state.pending.len() - before;
        if added == 0 {
            return;
        }
        state.submitted += added;
        state.batches += 1;

        debug!(
            queue = %self.settings.name,
            added,
            pending = state.pending.len(),
            "Added tasks to queue"
        );
    }

    /// Append a single task
    pub async fn push(&self, task: SyncTask) {
        self.add(std::iter::once(task)).await;
    }

    /// Number of tasks not yet executed
    pub async fn size(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.size().await == 0
    }

    /// Total number of tasks ever added
    pub async fn submitted(&self) -> usize {
        self.state.lock().await.submitted
    }

    /// Number of non-empty `add` calls
    pub async fn batches(&self) -> usize {
        self.state.lock().await.batches
    }

    /// Drain every pending task in order.
    ///
    /// Stops at the first failure (publishing one `Failed` snapshot) or when
    /// the abort signal is set before the next task starts (publishing
    /// nothing). Tasks added while the drain runs are picked up by it. Task
    /// failures and panics never escape; they are reported through the
    /// listeners and the returned outcome.
    ///
    /// Tasks may call `add`, `push` and `size` on the queue running them, but
    /// not `execute`: the drain lock is not reentrant, so a nested call waits
    /// for the outer drain and never returns.
    pub async fn execute(&self) -> DrainOutcome {
        let _drain = self.drain_lock.lock().await;

        let mut snapshot = ProgressSnapshot::started();
        let mut executed = 0usize;

        let pending = self.size().await;
        info!(
            queue = %self.settings.name,
            pending,
            "Executing sync queue"
        );

        loop {
            let task = {
                let mut state = self.state.lock().await;
                if state.pending.is_empty() {
                    break;
                }

                if self.abort.is_aborted() {
                    let remaining = state.pending.len();
                    info!(queue = %self.settings.name, remaining, "Aborting sync.");
                    return DrainOutcome::Aborted {
                        executed,
                        remaining,
                    };
                }

                let Some(task) = state.pending.pop_front() else {
                    break;
                };
                task
            };

            let label = task.label().to_string();
            debug!(queue = %self.settings.name, task = %label, id = task.id(), "Running task");

            let result = match AssertUnwindSafe(async move { task.into_future().await })
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(payload) => Err(SyncQueueError::from_panic(&label, payload).into()),
            };

            let remaining = self.size().await;

            match result {
                Ok(()) => {
                    executed += 1;
                    let computed = percentages::calculate(
                        executed,
                        executed + remaining,
                        self.settings.precision,
                    );
                    // Tasks appended mid-drain grow the total; never report going backwards
                    let percentage = computed.max(snapshot.percentage());

                    snapshot = snapshot.advanced(percentage, executed, remaining);
                    self.publish(&snapshot).await;
                }
                Err(e) => {
                    error!(
                        queue = %self.settings.name,
                        task = %label,
                        remaining,
                        "Task failed: {:#}",
                        e
                    );
                    let message = format!("{:#}", e);

                    snapshot = snapshot.failed(e, remaining);
                    self.publish(&snapshot).await;

                    return DrainOutcome::Failed {
                        executed,
                        remaining,
                        error: message,
                    };
                }
            }
        }

        info!(queue = %self.settings.name, executed, "Sync queue drained");
        DrainOutcome::Completed { executed }
    }

    /// Hand a snapshot to every listener. A panicking listener is logged and skipped.
    async fn publish(&self, snapshot: &ProgressSnapshot) {
        if self.settings.log_snapshots {
            debug!(
                queue = %self.settings.name,
                percentage = snapshot.percentage(),
                state = ?snapshot.state(),
                "Publishing progress"
            );
        }

        let listeners = self.listeners.read().await.clone();
        for listener in listeners {
            let delivered =
                std::panic::catch_unwind(AssertUnwindSafe(|| listener.on_progress(snapshot)));
            if let Err(payload) = delivered {
                error!(
                    queue = %self.settings.name,
                    "Progress listener panicked: {}",
                    panic_message(payload.as_ref())
                );
            }
        }
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
