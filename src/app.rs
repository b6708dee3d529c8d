//! Headless runner that drives a workload through a [`TaskQueue`] in phases.
//!
//! Each phase produces a batch of tasks which is added to the queue and
//! drained before the next phase is prepared.

use crate::queue::{DrainOutcome, TaskQueue};
use crate::sync::{AbortFlag, ProgressListener, ProgressSnapshot, SyncTask};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// Source of work for [`run`]
#[async_trait]
pub trait Workload: Send + Sync {
    /// Number of phases to run
    fn phases(&self) -> usize;

    /// Build the tasks for one phase
    async fn prepare(&self, phase: usize) -> Result<Vec<SyncTask>>;
}

/// Workload of sleeping tasks, one of which may be told to fail
#[derive(Debug, Clone)]
pub struct SimulatedWorkload {
    pub tasks: usize,
    pub phases: usize,
    pub fail_at: Option<usize>,
    pub delay: Duration,
}

impl SimulatedWorkload {
    fn phase_range(&self, phase: usize) -> std::ops::Range<usize> {
        let phases = self.phases.max(1);
        let chunk = self.tasks.div_ceil(phases);
        let start = (phase * chunk).min(self.tasks);
        let end = ((phase + 1) * chunk).min(self.tasks);
        start..end
    }
}

#[async_trait]
impl Workload for SimulatedWorkload {
    fn phases(&self) -> usize {
        self.phases.max(1)
    }

    async fn prepare(&self, phase: usize) -> Result<Vec<SyncTask>> {
        let tasks = self
            .phase_range(phase)
            .map(|index| {
                let delay = self.delay;
                let fail = self.fail_at == Some(index);
                SyncTask::new(format!("step-{}", index), move || async move {
                    tokio::time::sleep(delay).await;
                    if fail {
                        anyhow::bail!("simulated failure in step {}", index);
                    }
                    Ok(())
                })
            })
            .collect();
        Ok(tasks)
    }
}

/// Summary of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<DrainOutcome>,
    /// Tasks still pending in the queue after the run
    pub pending: usize,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(DrainOutcome::is_completed)
    }

    pub fn executed(&self) -> usize {
        self.outcomes.iter().map(DrainOutcome::executed).sum()
    }
}

/// Prepare and drain each phase in turn, stopping at the first drain that fails or aborts
pub async fn run(queue: &TaskQueue, workload: &dyn Workload) -> Result<RunReport> {
    let mut outcomes = Vec::new();

    for phase in 0..workload.phases() {
        let tasks = workload
            .prepare(phase)
            .await
            .with_context(|| format!("Failed to prepare phase {}", phase))?;

        info!("Phase {}: {} task(s)", phase, tasks.len());
        queue.add(tasks).await;

        let outcome = queue.execute().await;
        let stop = !outcome.is_completed();
        if stop {
            warn!("Phase {} stopped early: {}", phase, outcome);
        }
        outcomes.push(outcome);
        if stop {
            break;
        }
    }

    Ok(RunReport {
        outcomes,
        pending: queue.size().await,
    })
}

/// Listener that sets `flag` once `limit` tasks have completed.
///
/// A limit of zero raises the flag immediately, so no task runs.
pub fn abort_after(flag: AbortFlag, limit: usize) -> impl ProgressListener {
    if limit == 0 {
        flag.abort();
    }
    let completed = AtomicUsize::new(0);
    move |snapshot: &ProgressSnapshot| {
        if snapshot.is_failed() {
            return;
        }
        if completed.fetch_add(1, Ordering::SeqCst) + 1 >= limit {
            flag.abort();
        }
    }
}
