//! End-to-end demo over an in-memory world.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use stats_content::{Content, ContentFactory};
use stats_core::{CharacterId, ItemInstance, ItemInstanceId};
use stats_runtime::{
    BatchEvent, DomainEvent, Event, JobId, Repositories, RuntimeConfig, StatRuntime, Topic,
};
use tokio::sync::broadcast;
use tracing::info;

use crate::seed::seed;

/// Seed a world, equip an item, change a class baseline and print results
#[derive(Parser, Debug)]
pub struct Demo {
    /// Data directory containing attributes.ron, classes.ron, items.ron
    #[arg(long, default_value = "data")]
    pub data: PathBuf,

    /// Number of characters to create
    #[arg(long, default_value_t = 1000)]
    pub characters: u64,

    /// Characters per batch chunk (overrides config.toml and STATS_BATCH_SIZE)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Print values and statistics as JSON
    #[arg(long)]
    pub json: bool,

    /// Seconds to wait for batch jobs
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

impl Demo {
    pub async fn execute(self) -> Result<()> {
        let content = ContentFactory::new(&self.data)
            .load_content()
            .with_context(|| format!("Invalid content in {}", self.data.display()))?;
        let config = self.runtime_config(&content);
        info!(?config, "Runtime configuration");

        let repos = Repositories::in_memory();
        let characters = seed(&repos, &content, self.characters)?;
        let Some(&first) = characters.first() else {
            bail!("--characters must be at least 1");
        };

        let runtime = StatRuntime::builder()
            .config(config)
            .repositories(repos)
            .formulas(super::formulas()?)
            .build()
            .await?;
        let mut batch_events = runtime.subscribe(Topic::Batch);

        for &character in &characters {
            runtime.manager().get_all_visible_values(character)?;
        }
        info!("Warmed cache for {} characters", characters.len());

        self.equip_first_item(&runtime, &content, first)?;
        let jobs = self.raise_first_baseline(&runtime, &content)?;
        wait_for_jobs(&mut batch_events, &jobs, Duration::from_secs(self.timeout)).await?;
        let page = runtime.manager().config().default_batch_size;
        let swept = sweep_stale(&runtime, page)?;
        info!("Refreshed {} lazily invalidated entries", swept);

        let values = runtime.manager().get_all_visible_values(first)?;
        let stats = runtime.manager().cache_statistics()?;
        let metrics = runtime.metrics().snapshot();

        if self.json {
            let report = serde_json::json!({
                "character": first.0,
                "values": values,
                "statistics": stats,
                "batch_jobs": jobs.iter().map(|job| job.0).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{first}:");
            for value in &values {
                println!("  {:<14} {:>8}", value.label, value.value);
            }
            println!(
                "cache: {} entries, {} stale, freshness {:.2}",
                stats.total_entries, stats.stale_entries, stats.freshness_ratio
            );
            println!(
                "batches: {} completed, {} failed, {} recomputed, {} chunks, avg {:?}",
                metrics.jobs_completed,
                metrics.jobs_failed,
                metrics.characters_recomputed,
                metrics.chunks_committed,
                metrics.avg_job_time
            );
        }

        runtime.shutdown().await?;
        Ok(())
    }

    /// Defaults, then `config.toml`, then environment, then flags.
    fn runtime_config(&self, content: &Content) -> RuntimeConfig {
        let tuning = &content.config.cache;
        let mut config = RuntimeConfig::default();
        if let Some(size) = tuning.default_batch_size {
            config = config.with_batch_size(size);
        }
        if let Some(capacity) = tuning.queue_capacity {
            config = config.with_queue_capacity(capacity);
        }
        if let Some(buffer) = tuning.event_buffer_size {
            config = config.with_event_buffer(buffer);
        }
        config = config.overlay_env();
        if let Some(size) = self.batch_size {
            config = config.with_batch_size(size);
        }
        config
    }

    fn equip_first_item(
        &self,
        runtime: &StatRuntime,
        content: &Content,
        character: CharacterId,
    ) -> Result<()> {
        let Some(definition) = content.items.first() else {
            info!("No items in content; skipping equipment");
            return Ok(());
        };

        let item = ItemInstance {
            id: ItemInstanceId(1),
            owner: character,
            definition: definition.id,
            equipped: true,
            broken: false,
        };
        runtime.repositories().equipment.save_item(item)?;
        let outcome = runtime.router().dispatch(DomainEvent::ItemEquipped {
            character,
            item: item.id,
        })?;
        info!(
            "Equipped '{}' on {}: {} invalidated, {} recomputed",
            definition.name,
            character,
            outcome.invalidated,
            outcome.recomputed.len()
        );
        Ok(())
    }

    /// Adds 1 to the first baseline of the first class.
    fn raise_first_baseline(&self, runtime: &StatRuntime, content: &Content) -> Result<Vec<JobId>> {
        let Some(class) = content.classes.first() else {
            return Ok(Vec::new());
        };
        let Some(&(attribute, value)) = class.baselines.first() else {
            return Ok(Vec::new());
        };

        runtime
            .repositories()
            .sources
            .set_baseline(class.id, attribute, value + 1.0)?;
        let outcome = runtime.router().dispatch(DomainEvent::ClassBaselineChanged {
            class_id: class.id,
            attribute,
        })?;
        info!(
            "Raised {} baseline of '{}': {} invalidated, {} batch jobs",
            attribute,
            class.name,
            outcome.invalidated,
            outcome.batch_jobs.len()
        );
        Ok(outcome.batch_jobs)
    }
}

/// Recomputes every stale entry left behind by lazy invalidation.
fn sweep_stale(runtime: &StatRuntime, page: usize) -> Result<usize> {
    let manager = runtime.manager();
    let mut total = 0;
    for attribute in runtime.repositories().attributes.list()? {
        loop {
            let refreshed = manager.refresh_stale(attribute.id, page)?;
            total += refreshed;
            if refreshed < page {
                break;
            }
        }
    }
    Ok(total)
}

async fn wait_for_jobs(
    rx: &mut broadcast::Receiver<Event>,
    jobs: &[JobId],
    timeout: Duration,
) -> Result<()> {
    let mut pending = jobs.to_vec();
    tokio::time::timeout(timeout, async {
        while !pending.is_empty() {
            match rx.recv().await {
                Ok(Event::Batch(BatchEvent::Completed(report))) => {
                    info!(
                        "{} completed: {}/{} in {:?}",
                        report.job, report.recomputed, report.total, report.elapsed
                    );
                    pending.retain(|job| *job != report.job);
                }
                Ok(Event::Batch(BatchEvent::Failed { job, error })) => {
                    bail!("{job} failed: {error}");
                }
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => bail!("Event bus closed"),
            }
        }
        Ok(())
    })
    .await
    .context("Timed out waiting for batch jobs")?
}
