//! Progress tracking for queue drains

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// Drain state carried by each snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncState {
    #[default]
    Started,
    Failed,
}

/// Immutable record of drain progress at one point in time.
///
/// Snapshots are built by the queue and handed to listeners by reference.
/// Fields are only readable through getters, so a snapshot a listener keeps
/// (by cloning it) never changes after it was published.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSnapshot {
    percentage: f64,
    state: SyncState,
    #[serde(serialize_with = "serialize_error")]
    error: Option<Arc<anyhow::Error>>,
    completed: usize,
    remaining: usize,
    timestamp: DateTime<Utc>,
}

impl ProgressSnapshot {
    /// Initial snapshot for a drain: 0%, started, no error
    pub fn started() -> Self {
        Self {
            percentage: 0.0,
            state: SyncState::Started,
            error: None,
            completed: 0,
            remaining: 0,
            timestamp: Utc::now(),
        }
    }

    /// Snapshot after another task succeeded
    pub(crate) fn advanced(&self, percentage: f64, completed: usize, remaining: usize) -> Self {
        Self {
            percentage,
            state: self.state,
            error: None,
            completed,
            remaining,
            timestamp: Utc::now(),
        }
    }

    /// Snapshot for a failed task. Percentage stays where the last success left it.
    pub(crate) fn failed(&self, error: anyhow::Error, remaining: usize) -> Self {
        Self {
            percentage: self.percentage,
            state: SyncState::Failed,
            error: Some(Arc::new(error)),
            completed: self.completed,
            remaining,
            timestamp: Utc::now(),
        }
    }

    /// Progress percentage (0.0 to 100.0)
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// The failure captured from the task, if any
    pub fn error(&self) -> Option<&anyhow::Error> {
        self.error.as_deref()
    }

    /// Tasks completed so far in this drain
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Tasks still pending when the snapshot was taken
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_failed(&self) -> bool {
        self.state == SyncState::Failed
    }
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self::started()
    }
}

fn serialize_error<S>(error: &Option<Arc<anyhow::Error>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match error {
        Some(e) => serializer.serialize_some(&format!("{:#}", e)),
        None => serializer.serialize_none(),
    }
}

/// Percentage helpers
pub mod percentages {
    /// Maximum supported number of decimal places
    pub const MAX_PRECISION: u32 = 6;

    /// Percentage of `current` out of `total`, rounded to `precision` decimals.
    ///
    /// An empty total counts as fully done. The result is clamped to [0, 100].
    pub fn calculate(current: usize, total: usize, precision: u32) -> f64 {
        if total == 0 {
            return 100.0;
        }
        if current >= total {
            return 100.0;
        }

        let raw = current as f64 * 100.0 / total as f64;
        let factor = 10f64.powi(precision.min(MAX_PRECISION) as i32);
        let rounded = (raw * factor).round() / factor;

        // Rounding must not report completion while work remains
        if rounded >= 100.0 {
            return (100.0 * factor - 1.0) / factor;
        }
        rounded.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::percentages::calculate;
    use super::*;

    #[test]
    fn test_started_snapshot() {
        let snapshot = ProgressSnapshot::started();
        assert_eq!(snapshot.percentage(), 0.0);
        assert_eq!(snapshot.state(), SyncState::Started);
        assert!(snapshot.error().is_none());
    }

    #[test]
    fn test_advanced_does_not_touch_previous() {
        let first = ProgressSnapshot::started();
        let second = first.advanced(50.0, 1, 1);
        assert_eq!(first.percentage(), 0.0);
        assert_eq!(second.percentage(), 50.0);
        assert_eq!(second.completed(), 1);
        assert_eq!(second.remaining(), 1);
    }

    #[test]
    fn test_failed_keeps_percentage() {
        let snapshot = ProgressSnapshot::started().advanced(25.0, 1, 3);
        let failed = snapshot.failed(anyhow::anyhow!("boom"), 2);

        assert!(failed.is_failed());
        assert_eq!(failed.percentage(), 25.0);
        assert_eq!(failed.error().unwrap().to_string(), "boom");
        assert!(!snapshot.is_failed());
    }

    #[test]
    fn test_snapshot_serializes_error_as_string() {
        let failed = ProgressSnapshot::started().failed(anyhow::anyhow!("boom"), 0);
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["state"], "FAILED");
        assert_eq!(json["error"], "boom");

        let ok = serde_json::to_value(ProgressSnapshot::started()).unwrap();
        assert!(ok["error"].is_null());
        assert_eq!(ok["state"], "STARTED");
    }

    #[test]
    fn test_calculate_basic() {
        assert_eq!(calculate(1, 4, 2), 25.0);
        assert_eq!(calculate(1, 3, 2), 33.33);
        assert_eq!(calculate(2, 3, 0), 67.0);
        assert_eq!(calculate(3, 3, 2), 100.0);
    }

    #[test]
    fn test_calculate_empty_total() {
        assert_eq!(calculate(0, 0, 2), 100.0);
    }

    #[test]
    fn test_calculate_never_rounds_up_to_complete() {
        // 999/1000 = 99.9 -> rounds to 100 at zero decimals
        let value = calculate(999, 1000, 0);
        assert!(value < 100.0);
        assert_eq!(value, 99.0);
    }

    #[test]
    fn test_calculate_precision_is_capped() {
        let value = calculate(1, 3, 42);
        assert_eq!(value, 33.333333);
    }
}
