//! Units of asynchronous work submitted to a [`TaskQueue`](crate::queue::TaskQueue)

use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;

/// Result produced by a task once awaited
pub type TaskResult = anyhow::Result<()>;

type TaskFn = Box<dyn FnOnce() -> BoxFuture<'static, TaskResult> + Send>;

/// A zero-argument asynchronous operation.
///
/// The queue never inspects the work itself; the id and label only exist so
/// that log lines can name the task that ran or failed.
pub struct SyncTask {
    id: String,
    label: String,
    run: TaskFn,
}

impl SyncTask {
    /// Create a task from a closure returning a future
    pub fn new<F, Fut>(label: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            label: label.into(),
            run: Box::new(move || f().boxed()),
        }
    }

    /// Create an unlabeled task
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        Self::new("task", f)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Consume the task and produce its future
    pub(crate) fn into_future(self) -> BoxFuture<'static, TaskResult> {
        (self.run)()
    }
}

impl fmt::Debug for SyncTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncTask")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_task_runs_closure() {
        let task = SyncTask::new("ok", || async { Ok(()) });
        assert_eq!(task.label(), "ok");
        assert!(task.into_future().await.is_ok());
    }

    #[tokio::test]
    async fn test_task_propagates_error() {
        let task = SyncTask::from_fn(|| async { Err(anyhow::anyhow!("boom")) });
        let err = task.into_future().await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_task_ids_are_unique() {
        let a = SyncTask::from_fn(|| async { Ok(()) });
        let b = SyncTask::from_fn(|| async { Ok(()) });
        assert_ne!(a.id(), b.id());
        assert!(format!("{:?}", a).contains("SyncTask"));
    }
}
