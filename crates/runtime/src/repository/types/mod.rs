//! Shared types for repository layer.

mod cache_entry;
mod records;

pub use cache_entry::{CacheEntry, CacheKey, CacheStatistics};
pub use records::{CharacterClass, EffectId, TemporaryEffect};
