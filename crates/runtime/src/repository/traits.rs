//! Repository contracts for attribute sources and the value cache.
//!
//! Every store is injected behind one of these traits; tests and local runs
//! use the in-memory implementations in [`super::memory`].

use chrono::{DateTime, Utc};
use stats_core::{
    Attribute, AttributeId, Character, CharacterId, ClassId, ItemDefinitionId, ItemInstance,
    ItemInstanceId, Modifier,
};

use super::error::Result;
use super::types::{CacheEntry, CacheKey, CacheStatistics, CharacterClass, TemporaryEffect};

/// Attribute catalog.
pub trait AttributeRepository: Send + Sync {
    fn get(&self, id: AttributeId) -> Result<Option<Attribute>>;

    fn get_by_slug(&self, slug: &str) -> Result<Option<Attribute>>;

    /// All attributes ordered by display order, then slug.
    fn list(&self) -> Result<Vec<Attribute>>;

    /// Inserts or replaces an attribute. Slugs stay unique.
    fn save(&self, attribute: Attribute) -> Result<()>;

    /// Returns whether a row was removed.
    fn delete(&self, id: AttributeId) -> Result<bool>;
}

/// Character sheets and the classes they belong to.
pub trait CharacterRepository: Send + Sync {
    fn get(&self, id: CharacterId) -> Result<Option<Character>>;

    fn save(&self, character: Character) -> Result<()>;

    fn delete(&self, id: CharacterId) -> Result<bool>;

    /// All character ids in ascending order.
    fn list_ids(&self) -> Result<Vec<CharacterId>>;

    /// Character ids of one class in ascending order.
    fn list_by_class(&self, class_id: ClassId) -> Result<Vec<CharacterId>>;

    fn save_class(&self, class: CharacterClass) -> Result<()>;

    fn list_classes(&self) -> Result<Vec<CharacterClass>>;
}

/// `class_baseline` and `personal_override` tables.
pub trait SourceRepository: Send + Sync {
    fn baseline(&self, class_id: ClassId, attribute: AttributeId) -> Result<Option<f64>>;

    fn set_baseline(&self, class_id: ClassId, attribute: AttributeId, value: f64) -> Result<()>;

    /// Inserts `value` only when no row exists. Returns whether a row was created.
    fn ensure_baseline(&self, class_id: ClassId, attribute: AttributeId, value: f64)
    -> Result<bool>;

    fn override_value(&self, character: CharacterId, attribute: AttributeId)
    -> Result<Option<f64>>;

    fn set_override(&self, character: CharacterId, attribute: AttributeId, value: f64)
    -> Result<()>;

    /// Inserts a zero override only when no row exists.
    fn ensure_override(&self, character: CharacterId, attribute: AttributeId) -> Result<bool>;

    fn baselines_for_attribute(&self, attribute: AttributeId) -> Result<Vec<(ClassId, f64)>>;

    fn overrides_for_attribute(&self, attribute: AttributeId)
    -> Result<Vec<(CharacterId, f64)>>;

    /// Removes every baseline and override row of an attribute; returns the count.
    fn delete_by_attribute(&self, attribute: AttributeId) -> Result<usize>;

    fn delete_overrides_for_character(&self, character: CharacterId) -> Result<usize>;
}

/// Item definitions, their modifiers, and owned item instances.
pub trait EquipmentRepository: Send + Sync {
    fn item(&self, id: ItemInstanceId) -> Result<Option<ItemInstance>>;

    fn save_item(&self, item: ItemInstance) -> Result<()>;

    fn items_for_character(&self, character: CharacterId) -> Result<Vec<ItemInstance>>;

    fn definition_modifiers(&self, definition: ItemDefinitionId) -> Result<Vec<Modifier>>;

    fn set_definition_modifiers(
        &self,
        definition: ItemDefinitionId,
        modifiers: Vec<Modifier>,
    ) -> Result<()>;
}

/// Temporary effects applied to characters.
pub trait EffectRepository: Send + Sync {
    fn apply(&self, effect: TemporaryEffect) -> Result<()>;

    /// Effects still active at `now`.
    fn active_for_character(
        &self,
        character: CharacterId,
        now: DateTime<Utc>,
    ) -> Result<Vec<TemporaryEffect>>;
}

/// Durable `cache_entry` table keyed by (character, attribute).
pub trait CacheStore: Send + Sync {
    fn get(&self, key: CacheKey) -> Result<Option<CacheEntry>>;

    /// Idempotent overwrite with `stale = false`.
    fn upsert(&self, key: CacheKey, value: f64, computed_at: DateTime<Utc>) -> Result<()>;

    /// Writes a chunk of fresh values as one commit unit.
    fn upsert_many(&self, values: &[(CacheKey, f64)], computed_at: DateTime<Utc>) -> Result<()> {
        for (key, value) in values {
            self.upsert(*key, *value, computed_at)?;
        }
        Ok(())
    }

    /// Marks an existing entry stale, keeping its value. Returns whether an
    /// entry existed.
    fn mark_stale(&self, key: CacheKey) -> Result<bool>;

    /// Marks stale, creating a placeholder entry when none exists.
    fn ensure_stale(&self, key: CacheKey, placeholder: f64, now: DateTime<Utc>) -> Result<()>;

    fn mark_stale_for_character(&self, character: CharacterId) -> Result<usize>;

    fn mark_stale_for_attribute(&self, attribute: AttributeId) -> Result<usize>;

    fn delete_by_attribute(&self, attribute: AttributeId) -> Result<usize>;

    fn delete_by_character(&self, character: CharacterId) -> Result<usize>;

    /// Page of stale entries of one attribute, ordered by character.
    fn list_stale(&self, attribute: AttributeId, limit: usize, offset: usize)
    -> Result<Vec<CacheEntry>>;

    fn entries_for_character(&self, character: CharacterId) -> Result<Vec<CacheEntry>>;

    fn entries_for_attribute(&self, attribute: AttributeId) -> Result<Vec<CacheEntry>>;

    fn statistics(&self) -> Result<CacheStatistics>;
}
