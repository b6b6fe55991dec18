//! Batch recalculation worker.
mod common;

use std::sync::Arc;

use common::*;
use stats_core::{Formula, FormulaInputs, FormulaRegistry, StatError};
use stats_runtime::{
    BatchJob, BatchMetrics, BatchScope, BatchWorker, ChannelQueue, JobId, RuntimeConfig,
    RuntimeError, StatRuntime, Topic,
};

fn worker_for(runtime: &StatRuntime) -> BatchWorker {
    let (_queue, jobs) = ChannelQueue::channel(1);
    BatchWorker::new(
        runtime.manager(),
        jobs,
        runtime.event_bus(),
        Arc::new(BatchMetrics::new()),
    )
}

fn job(attribute: stats_core::AttributeId, batch_size: usize, scope: BatchScope) -> BatchJob {
    BatchJob {
        id: JobId(1),
        attribute,
        reason: "test".into(),
        batch_size,
        scope,
    }
}

/// Fails for characters whose force exceeds 50.
fn fragile_renown(inputs: &FormulaInputs<'_>) -> Result<f64, StatError> {
    let force = inputs.get("force")?;
    if force > 50.0 {
        return Err(StatError::Source("renown overflow".into()));
    }
    Ok(force)
}

#[tokio::test]
async fn every_character_gets_exactly_one_fresh_row() {
    for batch_size in [1, 4, 26, 100] {
        let repos = seeded_repositories();
        add_warriors(&repos, 23);
        let runtime = start(repos).await;
        let worker = worker_for(&runtime);

        let report = worker
            .run_job(&job(PV_MAX, batch_size, BatchScope::AllCharacters))
            .unwrap();

        assert_eq!(report.total, 26);
        assert_eq!(report.recomputed, 26);
        assert_eq!(report.failed, 0);
        assert_eq!(report.chunks, 26_usize.div_ceil(batch_size));

        let entries = runtime
            .repositories()
            .cache
            .entries_for_attribute(PV_MAX)
            .unwrap();
        assert_eq!(entries.len(), 26);
        assert!(entries.iter().all(|entry| entry.is_fresh()));
    }
}

#[tokio::test]
async fn class_scope_leaves_other_classes_alone() {
    let repos = seeded_repositories();
    add_warriors(&repos, 5);
    let runtime = start(repos).await;

    let report = worker_for(&runtime)
        .run_job(&job(FORCE, 2, BatchScope::Class(WARRIOR)))
        .unwrap();

    assert_eq!(report.total, 7);
    let cache = &runtime.repositories().cache;
    assert_eq!(cache.entries_for_attribute(FORCE).unwrap().len(), 7);
    assert!(cache.entries_for_character(APPRENTICE).unwrap().is_empty());
}

#[tokio::test]
async fn failing_characters_are_skipped() {
    let repos = seeded_repositories();
    let recruits = add_warriors(&repos, 4);
    repos.sources.set_override(recruits[2], FORCE, 60.0).unwrap();

    let mut formulas = FormulaRegistry::builtin();
    formulas
        .register_computed(Formula::new("renommee", &["force"], fragile_renown))
        .unwrap();
    let runtime = start_with(repos, RuntimeConfig::default(), formulas).await;
    let metrics = Arc::new(BatchMetrics::new());
    let (_queue, jobs) = ChannelQueue::channel(1);
    let worker = BatchWorker::new(runtime.manager(), jobs, runtime.event_bus(), metrics.clone());

    let report = worker
        .run_job(&job(RENOMMEE, 3, BatchScope::AllCharacters))
        .unwrap();

    assert_eq!(report.total, 7);
    assert_eq!(report.failed, 1);
    assert_eq!(report.recomputed, 6);
    assert_eq!(metrics.characters_failed(), 1);
    assert_eq!(metrics.characters_recomputed(), 6);

    let cache = &runtime.repositories().cache;
    let entries = cache.entries_for_attribute(RENOMMEE).unwrap();
    assert_eq!(entries.len(), 6);
    assert!(entries.iter().all(|e| e.key.character != recruits[2]));
    // HERO: force 20
    let hero = entries.iter().find(|e| e.key.character == HERO).unwrap();
    assert_eq!(hero.final_value, 20.0);
}

#[tokio::test]
async fn queued_jobs_run_in_the_background() {
    let repos = seeded_repositories();
    add_warriors(&repos, 10);
    let runtime = start(repos).await;
    let mut batch = runtime.subscribe(Topic::Batch);

    let id = runtime
        .manager()
        .trigger_batch_recalculation(CHARGE_MAX, "rebalance", Some(3), BatchScope::AllCharacters)
        .unwrap();
    wait_for_jobs(&mut batch, &[id]).await;

    let stats = runtime.manager().cache_statistics().unwrap();
    assert_eq!(stats.stale_entries, 0);
    assert_eq!(
        runtime
            .repositories()
            .cache
            .entries_for_attribute(CHARGE_MAX)
            .unwrap()
            .len(),
        13
    );
    let metrics = runtime.metrics().snapshot();
    assert_eq!(metrics.jobs_completed, 1);
    assert_eq!(metrics.chunks_committed, 5);
}

#[tokio::test]
async fn shutdown_drains_queued_jobs() {
    let runtime = start(seeded_repositories()).await;
    let manager = runtime.manager();
    let metrics = runtime.metrics();

    manager
        .trigger_batch_recalculation(FORCE, "drain", None, BatchScope::AllCharacters)
        .unwrap();
    runtime.shutdown().await.unwrap();

    assert_eq!(metrics.jobs_completed(), 1);
    assert!(matches!(
        manager.trigger_batch_recalculation(FORCE, "late", None, BatchScope::AllCharacters),
        Err(RuntimeError::QueueClosed)
    ));
}

#[tokio::test]
async fn full_queue_is_reported() {
    let config = RuntimeConfig::default().with_queue_capacity(1);
    let runtime = start_with(seeded_repositories(), config, FormulaRegistry::builtin()).await;
    let manager = runtime.manager();

    manager
        .trigger_batch_recalculation(FORCE, "first", None, BatchScope::AllCharacters)
        .unwrap();
    assert!(matches!(
        manager.trigger_batch_recalculation(FORCE, "second", None, BatchScope::AllCharacters),
        Err(RuntimeError::QueueFull)
    ));
}
