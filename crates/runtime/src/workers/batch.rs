//! Batch recalculation worker.
//!
//! Receives [`BatchJob`]s from the recalculation queue and recomputes one
//! attribute across the job's characters.
//!
//! Design principles:
//! - Chunks of `batch_size` characters are evaluated and committed
//!   independently via `upsert_many`; there is no job-wide transaction
//! - A character that fails to evaluate is logged and skipped, never fatal
//! - Chunks run on tokio's blocking pool; evaluation is synchronous

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use stats_core::{AttributeId, CharacterId};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::{Result, RuntimeError};
use crate::cache::CacheManager;
use crate::events::{BatchEvent, EventBus};
use crate::repository::CacheKey;
use crate::workers::{BatchJob, BatchMetrics, BatchScope, JobId};

/// Outcome of one batch job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub job: JobId,
    pub attribute: AttributeId,
    /// Characters in scope when the job started.
    pub total: usize,
    /// Characters recomputed and committed.
    pub recomputed: usize,
    /// Characters skipped because evaluation failed.
    pub failed: usize,
    pub chunks: usize,
    pub elapsed: Duration,
}

/// Evaluated values of one chunk, ready to commit.
#[derive(Default)]
struct ChunkOutcome {
    values: Vec<(CacheKey, f64)>,
    failed: usize,
}

/// Background worker draining the recalculation queue.
pub struct BatchWorker {
    manager: Arc<CacheManager>,

    jobs: mpsc::Receiver<BatchJob>,

    /// Event bus for publishing Batch events
    event_bus: EventBus,

    /// Shared with the runtime for querying
    metrics: Arc<BatchMetrics>,
}

impl BatchWorker {
    pub fn new(
        manager: Arc<CacheManager>,
        jobs: mpsc::Receiver<BatchJob>,
        event_bus: EventBus,
        metrics: Arc<BatchMetrics>,
    ) -> Self {
        Self {
            manager,
            jobs,
            event_bus,
            metrics,
        }
    }

    /// Returns a clone of the metrics Arc for external querying.
    pub fn metrics(&self) -> Arc<BatchMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Main worker loop. Exits once the queue is closed and drained.
    pub async fn run(mut self) {
        info!("BatchWorker started");

        while let Some(job) = self.jobs.recv().await {
            let id = job.id;
            match self.run_job_async(job).await {
                Ok(report) => {
                    info!(
                        "Batch {} done: {}/{} recomputed, {} failed, {} chunks in {:?}",
                        id,
                        report.recomputed,
                        report.total,
                        report.failed,
                        report.chunks,
                        report.elapsed
                    );
                }
                Err(e) => {
                    error!("Batch {} failed: {}", id, e);
                    self.metrics.record_job_failure();
                    self.event_bus.publish(BatchEvent::Failed {
                        job: id,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!("BatchWorker stopped");
    }

    /// Runs `job` on the current thread.
    pub fn run_job(&self, job: &BatchJob) -> Result<BatchReport> {
        let started = Instant::now();
        let characters = affected_characters(&self.manager, job.scope)?;
        self.announce(job, characters.len());

        let mut report = empty_report(job, characters.len());
        for chunk in characters.chunks(job.batch_size.max(1)) {
            let outcome = evaluate_chunk(&self.manager, job.attribute, chunk);
            self.commit(job, outcome, &mut report)?;
        }
        Ok(self.finish(report, started.elapsed()))
    }

    /// Same as [`Self::run_job`], with each chunk evaluated on the blocking pool.
    async fn run_job_async(&self, job: BatchJob) -> Result<BatchReport> {
        let started = Instant::now();
        let manager = Arc::clone(&self.manager);
        let scope = job.scope;
        let characters = tokio::task::spawn_blocking(move || affected_characters(&manager, scope))
            .await
            .map_err(RuntimeError::WorkerJoin)??;
        self.announce(&job, characters.len());

        let mut report = empty_report(&job, characters.len());
        for chunk in characters.chunks(job.batch_size.max(1)) {
            let manager = Arc::clone(&self.manager);
            let attribute = job.attribute;
            let chunk = chunk.to_vec();
            let outcome =
                tokio::task::spawn_blocking(move || evaluate_chunk(&manager, attribute, &chunk))
                    .await
                    .map_err(RuntimeError::WorkerJoin)?;
            self.commit(&job, outcome, &mut report)?;
        }
        Ok(self.finish(report, started.elapsed()))
    }

    fn announce(&self, job: &BatchJob, total: usize) {
        info!(
            "Batch {} started: attribute {} over {} characters ({})",
            job.id, job.attribute, total, job.reason
        );
        self.event_bus.publish(BatchEvent::Started {
            job: job.id,
            attribute: job.attribute,
            total,
        });
    }

    fn commit(
        &self,
        job: &BatchJob,
        outcome: ChunkOutcome,
        report: &mut BatchReport,
    ) -> Result<()> {
        self.manager
            .repositories()
            .cache
            .upsert_many(&outcome.values, Utc::now())?;

        report.recomputed += outcome.values.len();
        report.failed += outcome.failed;
        report.chunks += 1;
        self.metrics.record_chunk(outcome.values.len(), outcome.failed);

        debug!(
            "Batch {} committed chunk {} ({} values)",
            job.id,
            report.chunks,
            outcome.values.len()
        );
        self.event_bus.publish(BatchEvent::ChunkCommitted {
            job: job.id,
            processed: report.recomputed + report.failed,
            total: report.total,
        });
        Ok(())
    }

    fn finish(&self, mut report: BatchReport, elapsed: Duration) -> BatchReport {
        report.elapsed = elapsed;
        self.metrics.record_job(elapsed);
        self.event_bus.publish(BatchEvent::Completed(report.clone()));
        report
    }
}

fn empty_report(job: &BatchJob, total: usize) -> BatchReport {
    BatchReport {
        job: job.id,
        attribute: job.attribute,
        total,
        recomputed: 0,
        failed: 0,
        chunks: 0,
        elapsed: Duration::ZERO,
    }
}

fn affected_characters(manager: &CacheManager, scope: BatchScope) -> Result<Vec<CharacterId>> {
    let characters = &manager.repositories().characters;
    Ok(match scope {
        BatchScope::AllCharacters => characters.list_ids()?,
        BatchScope::Class(class_id) => characters.list_by_class(class_id)?,
    })
}

fn evaluate_chunk(
    manager: &CacheManager,
    attribute: AttributeId,
    characters: &[CharacterId],
) -> ChunkOutcome {
    let mut outcome = ChunkOutcome::default();
    for &character in characters {
        let key = CacheKey::new(character, attribute);
        match manager.evaluate(key) {
            Ok(value) => outcome.values.push((key, value)),
            Err(e) => {
                warn!("Skipping {} in batch recalculation: {}", key, e);
                outcome.failed += 1;
            }
        }
    }
    outcome
}
