//! Batch recalculation metrics.
//!
//! Tracks job throughput, per-character failures and processing time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Batch metrics tracked by BatchWorker.
///
/// Uses atomics for lock-free access across threads.
#[derive(Debug, Default)]
pub struct BatchMetrics {
    /// Jobs that ran to completion (possibly with skipped characters)
    jobs_completed: AtomicU64,

    /// Jobs that could not determine their affected set
    jobs_failed: AtomicU64,

    /// Characters whose value was recomputed and committed
    characters_recomputed: AtomicU64,

    /// Characters skipped because evaluation failed
    characters_failed: AtomicU64,

    /// Chunks committed via `upsert_many`
    chunks_committed: AtomicU64,

    /// Total time spent in jobs (nanoseconds)
    total_job_time_nanos: AtomicU64,
}

impl BatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_chunk(&self, recomputed: usize, failed: usize) {
        self.chunks_committed.fetch_add(1, Ordering::Relaxed);
        self.characters_recomputed
            .fetch_add(recomputed as u64, Ordering::Relaxed);
        self.characters_failed
            .fetch_add(failed as u64, Ordering::Relaxed);
    }

    pub fn record_job(&self, elapsed: Duration) {
        self.jobs_completed.fetch_add(1, Ordering::Relaxed);
        self.total_job_time_nanos
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn record_job_failure(&self) {
        self.jobs_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn jobs_completed(&self) -> u64 {
        self.jobs_completed.load(Ordering::Relaxed)
    }

    pub fn jobs_failed(&self) -> u64 {
        self.jobs_failed.load(Ordering::Relaxed)
    }

    pub fn characters_recomputed(&self) -> u64 {
        self.characters_recomputed.load(Ordering::Relaxed)
    }

    pub fn characters_failed(&self) -> u64 {
        self.characters_failed.load(Ordering::Relaxed)
    }

    pub fn chunks_committed(&self) -> u64 {
        self.chunks_committed.load(Ordering::Relaxed)
    }

    /// Average wall time per completed job.
    pub fn avg_job_time(&self) -> Duration {
        let completed = self.jobs_completed();
        if completed == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.total_job_time_nanos.load(Ordering::Relaxed) / completed)
        }
    }

    /// Individual fields are read atomically; the snapshot as a whole is not.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            jobs_completed: self.jobs_completed(),
            jobs_failed: self.jobs_failed(),
            characters_recomputed: self.characters_recomputed(),
            characters_failed: self.characters_failed(),
            chunks_committed: self.chunks_committed(),
            avg_job_time: self.avg_job_time(),
        }
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub jobs_completed: u64,
    pub jobs_failed: u64,
    pub characters_recomputed: u64,
    pub characters_failed: u64,
    pub chunks_committed: u64,
    pub avg_job_time: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_job_time_ignores_empty_history() {
        let metrics = BatchMetrics::new();
        assert_eq!(metrics.avg_job_time(), Duration::ZERO);

        metrics.record_job(Duration::from_millis(10));
        metrics.record_job(Duration::from_millis(30));
        metrics.record_chunk(5, 1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.jobs_completed, 2);
        assert_eq!(snapshot.avg_job_time, Duration::from_millis(20));
        assert_eq!(snapshot.characters_recomputed, 5);
        assert_eq!(snapshot.characters_failed, 1);
    }
}
