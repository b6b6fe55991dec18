//! Traits describing the read-only sources the evaluator draws from.
//!
//! Oracles expose the attribute catalog, characters, class baselines and
//! personal overrides, and the modifier rows granted by equipment and
//! temporary effects. The [`StatEnv`] aggregate bundles them so the
//! evaluator never couples to a concrete store.
mod sources;

pub use sources::{
    AttributeOracle, CharacterOracle, DependencyResolver, EffectOracle, EquipmentOracle,
    SourceOracle,
};

/// Aggregates the read-only oracles required by the evaluator.
#[derive(Clone, Copy)]
pub struct StatEnv<'a> {
    attributes: &'a dyn AttributeOracle,
    characters: &'a dyn CharacterOracle,
    sources: &'a dyn SourceOracle,
    equipment: &'a dyn EquipmentOracle,
    effects: &'a dyn EffectOracle,
}

impl<'a> StatEnv<'a> {
    pub fn new(
        attributes: &'a dyn AttributeOracle,
        characters: &'a dyn CharacterOracle,
        sources: &'a dyn SourceOracle,
        equipment: &'a dyn EquipmentOracle,
        effects: &'a dyn EffectOracle,
    ) -> Self {
        Self {
            attributes,
            characters,
            sources,
            equipment,
            effects,
        }
    }

    pub fn attributes(&self) -> &'a dyn AttributeOracle {
        self.attributes
    }

    pub fn characters(&self) -> &'a dyn CharacterOracle {
        self.characters
    }

    pub fn sources(&self) -> &'a dyn SourceOracle {
        self.sources
    }

    pub fn equipment(&self) -> &'a dyn EquipmentOracle {
        self.equipment
    }

    pub fn effects(&self) -> &'a dyn EffectOracle {
        self.effects
    }
}
