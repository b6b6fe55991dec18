//! Repository layer for attribute sources and cached values.
//!
//! Repositories hold data that changes while the game runs:
//! - Attribute catalog, characters and classes
//! - Class baselines and personal overrides
//! - Equipment and temporary effects
//! - The `cache_entry` table of final values
//!
//! The pure rules that turn these rows into final values live in `stats-core`;
//! [`crate::oracle`] adapts the repositories to its oracle traits.

mod error;
mod memory;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use memory::{
    InMemoryAttributeRepository, InMemoryCacheStore, InMemoryCharacterRepository,
    InMemoryEffectRepository, InMemoryEquipmentRepository, InMemorySourceRepository,
};
pub use traits::{
    AttributeRepository, CacheStore, CharacterRepository, EffectRepository, EquipmentRepository,
    SourceRepository,
};
pub use types::{
    CacheEntry, CacheKey, CacheStatistics, CharacterClass, EffectId, TemporaryEffect,
};
