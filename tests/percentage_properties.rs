//! Property checks for progress percentages

use proptest::prelude::*;
use std::sync::{Arc, Mutex};
use sync_queue::sync::percentages::calculate;
use sync_queue::{NeverAbort, ProgressSnapshot, SyncTask, TaskQueue};

proptest! {
    #[test]
    fn calculate_stays_in_range(current in 0usize..10_000, total in 0usize..10_000, precision in 0u32..8) {
        let value = calculate(current, total, precision);
        prop_assert!((0.0..=100.0).contains(&value));
    }

    #[test]
    fn calculate_only_reports_100_when_done(total in 1usize..5_000, precision in 0u32..4) {
        for current in 0..total {
            prop_assert!(calculate(current, total, precision) < 100.0);
        }
        prop_assert_eq!(calculate(total, total, precision), 100.0);
    }

    #[test]
    fn calculate_is_monotonic_in_current(total in 1usize..2_000, precision in 0u32..4) {
        let mut last = 0.0;
        for current in 0..=total {
            let value = calculate(current, total, precision);
            prop_assert!(value >= last);
            last = value;
        }
    }

    #[test]
    fn successful_drain_is_monotonic_and_ends_at_100(n in 1usize..60) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        rt.block_on(async {
            let queue = TaskQueue::new(NeverAbort, move |s: &ProgressSnapshot| {
                sink.lock().unwrap().push(s.percentage());
            });
            queue
                .add((0..n).map(|_| SyncTask::from_fn(|| async { Ok(()) })))
                .await;
            queue.execute().await;
        });

        let seen = seen.lock().unwrap();
        prop_assert_eq!(seen.len(), n);
        prop_assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(*seen.last().unwrap(), 100.0);
    }
}
