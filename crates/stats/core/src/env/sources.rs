use crate::error::StatError;
use crate::types::{Attribute, AttributeId, Character, CharacterId, ClassId, Modifier};

pub trait AttributeOracle: Send + Sync {
    fn attribute(&self, id: AttributeId) -> Result<Option<Attribute>, StatError>;

    fn attribute_by_slug(&self, slug: &str) -> Result<Option<Attribute>, StatError>;
}

pub trait CharacterOracle: Send + Sync {
    fn character(&self, id: CharacterId) -> Result<Option<Character>, StatError>;
}

/// Class baselines and personal overrides.
pub trait SourceOracle: Send + Sync {
    fn class_baseline(
        &self,
        class_id: ClassId,
        attribute: AttributeId,
    ) -> Result<Option<f64>, StatError>;

    fn personal_override(
        &self,
        character: CharacterId,
        attribute: AttributeId,
    ) -> Result<Option<f64>, StatError>;
}

pub trait EquipmentOracle: Send + Sync {
    /// Modifier rows for `attribute` from the character's equipped, unbroken items.
    fn equipment_modifiers(
        &self,
        character: CharacterId,
        attribute: AttributeId,
    ) -> Result<Vec<Modifier>, StatError>;
}

pub trait EffectOracle: Send + Sync {
    /// Modifier rows for `attribute` from the character's unexpired effects.
    fn effect_modifiers(
        &self,
        character: CharacterId,
        attribute: AttributeId,
    ) -> Result<Vec<Modifier>, StatError>;
}

/// Supplies dependency values to derived formulas.
///
/// The cache manager resolves through the cache (recomputing stale
/// dependencies); pure callers can resolve by evaluating directly.
pub trait DependencyResolver {
    fn resolve(&self, character: CharacterId, attribute: &Attribute) -> Result<f64, StatError>;
}
