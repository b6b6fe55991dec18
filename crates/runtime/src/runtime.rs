//! High-level runtime orchestrator.
//!
//! The runtime owns the batch worker, wires the recalculation queue and event
//! bus into the cache manager, and exposes a builder-based API.

use std::sync::Arc;

use stats_core::FormulaRegistry;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;

use crate::api::{Result, RuntimeError};
use crate::cache::CacheManager;
use crate::config::RuntimeConfig;
use crate::events::{Event, EventBus, Topic};
use crate::oracle::Repositories;
use crate::router::InvalidationRouter;
use crate::workers::{BatchMetrics, BatchWorker, ChannelQueue};

/// Running cache runtime.
///
/// Design: the runtime owns the worker; [`CacheManager`] and
/// [`InvalidationRouter`] are cheap shared handles for callers.
pub struct StatRuntime {
    manager: Arc<CacheManager>,
    router: InvalidationRouter,
    queue: Arc<ChannelQueue>,
    event_bus: EventBus,
    metrics: Arc<BatchMetrics>,
    worker_handle: JoinHandle<()>,
}

impl StatRuntime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn manager(&self) -> Arc<CacheManager> {
        Arc::clone(&self.manager)
    }

    pub fn router(&self) -> InvalidationRouter {
        self.router.clone()
    }

    pub fn repositories(&self) -> &Repositories {
        self.manager.repositories()
    }

    pub fn event_bus(&self) -> EventBus {
        self.event_bus.clone()
    }

    /// Subscribe to events of one topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    pub fn metrics(&self) -> Arc<BatchMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Closes the queue and waits for the worker to drain queued jobs.
    pub async fn shutdown(self) -> Result<()> {
        self.queue.close();
        self.worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;
        info!("Stat runtime stopped");
        Ok(())
    }
}

/// Builder for [`StatRuntime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    repositories: Option<Repositories>,
    formulas: Option<FormulaRegistry>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            repositories: None,
            formulas: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Use these stores instead of fresh in-memory ones
    pub fn repositories(mut self, repositories: Repositories) -> Self {
        self.repositories = Some(repositories);
        self
    }

    /// Use this formula registry instead of [`FormulaRegistry::builtin`]
    pub fn formulas(mut self, formulas: FormulaRegistry) -> Self {
        self.formulas = Some(formulas);
        self
    }

    /// Validates the formula registry against the attribute catalog and
    /// spawns the batch worker. Must be called within a tokio runtime.
    pub async fn build(self) -> Result<StatRuntime> {
        let repositories = self.repositories.unwrap_or_else(Repositories::in_memory);
        let formulas = self.formulas.unwrap_or_else(FormulaRegistry::builtin);

        let catalog = repositories.attributes.list()?;
        formulas.validate(&catalog)?;

        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let (queue, jobs) = ChannelQueue::channel(self.config.queue_capacity);
        let queue = Arc::new(queue);
        let metrics = Arc::new(BatchMetrics::new());

        let manager = Arc::new(CacheManager::new(
            repositories,
            Arc::new(formulas),
            queue.clone(),
            event_bus.clone(),
            self.config,
        ));

        let worker = BatchWorker::new(
            Arc::clone(&manager),
            jobs,
            event_bus.clone(),
            Arc::clone(&metrics),
        );
        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        info!("Stat runtime started with {} attributes", catalog.len());

        Ok(StatRuntime {
            router: InvalidationRouter::new(Arc::clone(&manager)),
            manager,
            queue,
            event_bus,
            metrics,
            worker_handle,
        })
    }
}
