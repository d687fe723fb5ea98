// cardsynctool/src/analytics/mod.rs
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Run-scoped outcome counters, shared by reference between the components
/// of one sync run. Counters are atomic so concurrent transfer tasks can
/// record outcomes without lost updates; the failed-source list is guarded
/// by a mutex and keeps insertion order.
#[derive(Debug, Default)]
pub struct RunAnalytics {
    total: AtomicUsize,
    processed: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    failed_sources: Mutex<Vec<String>>,
}

/// Immutable copy of the counters at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsSnapshot {
    pub total: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failed_sources: Vec<String>,
}

impl RunAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total upfront, for flows that know the item count before
    /// processing starts (the card sync does; the image mirror counts as
    /// tasks finish instead).
    pub fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
    }

    pub fn bump_total(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn mark_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn mark_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn mark_failed(&self, source: impl Into<String>) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.failed_sources
            .lock()
            .expect("failed-source list poisoned")
            .push(source.into());
    }

    pub fn snapshot(&self) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            total: self.total.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            failed_sources: self
                .failed_sources
                .lock()
                .expect("failed-source list poisoned")
                .clone(),
        }
    }

    /// Renders the end-of-run report.
    pub fn report(&self) {
        let snapshot = self.snapshot();
        println!("Analytics:");
        if !snapshot.failed_sources.is_empty() {
            println!("Failed sources: {:?}", snapshot.failed_sources);
        }
        println!("Total: {}", snapshot.total);
        println!("Processed: {}", snapshot.processed);
        println!("Skipped: {}", snapshot.skipped);
        println!("Failed: {}", snapshot.failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_accumulate() {
        let analytics = RunAnalytics::new();
        analytics.set_total(3);
        analytics.mark_processed();
        analytics.mark_skipped();
        analytics.mark_failed("https://images.test/a.jpg");

        let snapshot = analytics.snapshot();
        assert_eq!(snapshot.total, 3);
        assert_eq!(snapshot.processed, 1);
        assert_eq!(snapshot.skipped, 1);
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.failed_sources, vec!["https://images.test/a.jpg"]);
    }

    #[test]
    fn test_failure_order_is_preserved() {
        let analytics = RunAnalytics::new();
        analytics.mark_failed("first");
        analytics.mark_failed("second");

        assert_eq!(analytics.snapshot().failed_sources, vec!["first", "second"]);
    }
}
