//! Adapters exposing the runtime repositories as `stats-core` oracles.
//!
//! [`Repositories`] bundles every store behind an `Arc` and implements the
//! oracle traits so the runtime can build a [`StatEnv`] on demand. Repository
//! failures surface to the evaluator as [`stats_core::StatError::Source`].
mod sources;

use std::sync::Arc;

use stats_core::StatEnv;

use crate::repository::{
    AttributeRepository, CacheStore, CharacterRepository, EffectRepository, EquipmentRepository,
    InMemoryAttributeRepository, InMemoryCacheStore, InMemoryCharacterRepository,
    InMemoryEffectRepository, InMemoryEquipmentRepository, InMemorySourceRepository,
    SourceRepository,
};

/// Every repository the cache runtime reads or writes.
#[derive(Clone)]
pub struct Repositories {
    pub attributes: Arc<dyn AttributeRepository>,
    pub characters: Arc<dyn CharacterRepository>,
    pub sources: Arc<dyn SourceRepository>,
    pub equipment: Arc<dyn EquipmentRepository>,
    pub effects: Arc<dyn EffectRepository>,
    pub cache: Arc<dyn CacheStore>,
}

impl Repositories {
    /// Fresh, empty in-memory stores.
    pub fn in_memory() -> Self {
        Self {
            attributes: Arc::new(InMemoryAttributeRepository::new()),
            characters: Arc::new(InMemoryCharacterRepository::new()),
            sources: Arc::new(InMemorySourceRepository::new()),
            equipment: Arc::new(InMemoryEquipmentRepository::new()),
            effects: Arc::new(InMemoryEffectRepository::new()),
            cache: Arc::new(InMemoryCacheStore::new()),
        }
    }

    /// Borrows the repositories as an evaluation environment.
    pub fn as_stat_env(&self) -> StatEnv<'_> {
        StatEnv::new(self, self, self, self, self)
    }
}
