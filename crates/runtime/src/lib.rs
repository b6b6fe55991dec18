//! Runtime for the reactive character-attribute cache.
//!
//! This crate wires the pure evaluator from `stats-core` to repositories, a
//! per-key cache manager, an event-driven invalidation router and a batch
//! recalculation worker. Consumers embed [`StatRuntime`] and feed domain
//! events to its [`InvalidationRouter`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`cache`] owns synchronous reads and invalidation
//! - [`router`] maps domain events onto cache operations
//! - [`events`] provides topic-based event bus for observability
//! - [`workers`] runs batch recalculation in the background
//! - [`oracle`] and [`repository`] provide data adapters reused by other crates
pub mod api;
pub mod cache;
pub mod config;
pub mod events;
pub mod oracle;
pub mod repository;
pub mod router;
pub mod runtime;
pub mod workers;

pub use api::{Result, RuntimeError};
pub use cache::{AttributeValue, CacheManager, DependentInvalidation};
pub use config::RuntimeConfig;
pub use events::{BatchEvent, CacheEvent, Event, EventBus, InvalidationScope, Topic};
pub use oracle::Repositories;
pub use repository::{
    AttributeRepository, CacheEntry, CacheKey, CacheStatistics, CacheStore, CharacterClass,
    CharacterRepository, EffectId, EffectRepository, EquipmentRepository,
    InMemoryAttributeRepository, InMemoryCacheStore, InMemoryCharacterRepository,
    InMemoryEffectRepository, InMemoryEquipmentRepository, InMemorySourceRepository,
    RepositoryError, SourceRepository, TemporaryEffect,
};
pub use router::{AttributeField, DomainEvent, DomainEventHandler, InvalidationRouter, RouteOutcome};
pub use runtime::{RuntimeBuilder, StatRuntime};
pub use workers::{
    BatchJob, BatchMetrics, BatchReport, BatchScope, BatchWorker, ChannelQueue, JobId,
    MetricsSnapshot, RecalculationQueue,
};
