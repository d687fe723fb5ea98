// cardsynctool/src/images/scheduler.rs
use anyhow::Result;
use futures::future::join_all;
use std::future::Future;
use std::time::Duration;

/// What one scheduled task reported about its unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The destination already had the item; nothing was transferred.
    Skipped,
    /// Real work happened.
    Completed,
    /// The task failed but absorbed its own error.
    Failed,
}

/// Observable pacing of one scheduler run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchRunReport {
    pub batches: usize,
    pub pauses: usize,
    pub batch_failures: usize,
}

/// Drives `tasks` in contiguous batches of at most `batch_size`. All tasks
/// of a batch run concurrently; the next batch never starts before the
/// current one fully resolves.
///
/// After a batch, the scheduler pauses for `pause` unless every task in the
/// batch reported [`TaskOutcome::Skipped`] — no-op batches run back-to-back,
/// anything that moved bytes is throttled. A batch where an error escapes a
/// task (tasks are expected to absorb their own failures) is logged together
/// with the offending batch contents and does not abort the remaining
/// batches.
///
/// Assignment to batches is purely positional; no reordering.
pub async fn run_in_batches<T, F, Fut>(
    tasks: &[T],
    batch_size: usize,
    pause: Duration,
    run: F,
) -> BatchRunReport
where
    T: Clone + std::fmt::Debug,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<TaskOutcome>>,
{
    let batch_size = batch_size.max(1);
    let mut report = BatchRunReport::default();

    for batch in tasks.chunks(batch_size) {
        report.batches += 1;

        let results = join_all(batch.iter().map(|task| run(task.clone()))).await;
        match results.into_iter().collect::<Result<Vec<_>>>() {
            Ok(outcomes) => {
                let all_skipped = outcomes.iter().all(|o| *o == TaskOutcome::Skipped);
                if !all_skipped {
                    report.pauses += 1;
                    tokio::time::sleep(pause).await;
                }
            }
            Err(err) => {
                report.batch_failures += 1;
                eprintln!("❌ Something went wrong while processing a batch: {:#}", err);
                eprintln!("   Offending batch: {:?}", batch);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const NO_PAUSE: Duration = Duration::from_millis(0);

    #[tokio::test]
    async fn test_all_skipped_batches_never_pause() {
        let tasks: Vec<u32> = (0..40).collect();
        let report =
            run_in_batches(&tasks, 19, NO_PAUSE, |_| async { Ok(TaskOutcome::Skipped) }).await;

        assert_eq!(report.batches, 3);
        assert_eq!(report.pauses, 0);
        assert_eq!(report.batch_failures, 0);
    }

    #[tokio::test]
    async fn test_working_batches_pause_between_and_after() {
        let tasks: Vec<u32> = (0..40).collect();
        let report =
            run_in_batches(&tasks, 19, NO_PAUSE, |_| async { Ok(TaskOutcome::Completed) }).await;

        assert_eq!(report.batches, 3);
        // At least ceil(40/19) - 1 = 2; this scheduler pauses after every
        // working batch, including the final one.
        assert_eq!(report.pauses, 3);
    }

    #[tokio::test]
    async fn test_mixed_batch_pauses_the_full_interval() {
        let tasks: Vec<u32> = (0..4).collect();
        let report = run_in_batches(&tasks, 4, NO_PAUSE, |task| async move {
            if task == 0 {
                Ok(TaskOutcome::Completed)
            } else {
                Ok(TaskOutcome::Skipped)
            }
        })
        .await;

        assert_eq!(report.batches, 1);
        assert_eq!(report.pauses, 1);
    }

    #[tokio::test]
    async fn test_failed_tasks_count_as_working_for_pacing() {
        let tasks: Vec<u32> = (0..2).collect();
        let report =
            run_in_batches(&tasks, 2, NO_PAUSE, |_| async { Ok(TaskOutcome::Failed) }).await;

        assert_eq!(report.pauses, 1);
    }

    #[tokio::test]
    async fn test_escaping_error_does_not_abort_remaining_batches() {
        let tasks: Vec<u32> = (0..6).collect();
        let completed = AtomicUsize::new(0);

        let report = run_in_batches(&tasks, 2, NO_PAUSE, |task| {
            let completed = &completed;
            async move {
                if task == 2 {
                    anyhow::bail!("unexpected task failure");
                }
                completed.fetch_add(1, Ordering::Relaxed);
                Ok(TaskOutcome::Completed)
            }
        })
        .await;

        assert_eq!(report.batches, 3);
        assert_eq!(report.batch_failures, 1);
        // Batch [2, 3] failed as a unit, but batches [0, 1] and [4, 5] ran.
        // Task 3 shared the failing batch yet still executed to completion.
        assert_eq!(completed.load(Ordering::Relaxed), 5);
    }

    #[tokio::test]
    async fn test_assignment_is_positional() {
        let tasks: Vec<u32> = (0..5).collect();
        let seen = Mutex::new(Vec::new());

        run_in_batches(&tasks, 2, NO_PAUSE, |task| {
            let seen = &seen;
            async move {
                seen.lock().unwrap().push(task);
                Ok(TaskOutcome::Skipped)
            }
        })
        .await;

        // Batches are contiguous slices in input order; these futures finish
        // on their first poll, so the trace is stable.
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }
}
