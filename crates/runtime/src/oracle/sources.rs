//! Oracle trait implementations for [`Repositories`].
use chrono::Utc;
use stats_core::{
    Attribute, AttributeId, AttributeOracle, Character, CharacterId, CharacterOracle, ClassId,
    EffectOracle, EquipmentOracle, Modifier, SourceOracle, StatError,
};

use super::Repositories;
use crate::repository::RepositoryError;

fn source_error(err: RepositoryError) -> StatError {
    StatError::Source(err.to_string())
}

impl AttributeOracle for Repositories {
    fn attribute(&self, id: AttributeId) -> Result<Option<Attribute>, StatError> {
        self.attributes.get(id).map_err(source_error)
    }

    fn attribute_by_slug(&self, slug: &str) -> Result<Option<Attribute>, StatError> {
        self.attributes.get_by_slug(slug).map_err(source_error)
    }
}

impl CharacterOracle for Repositories {
    fn character(&self, id: CharacterId) -> Result<Option<Character>, StatError> {
        self.characters.get(id).map_err(source_error)
    }
}

impl SourceOracle for Repositories {
    fn class_baseline(
        &self,
        class_id: ClassId,
        attribute: AttributeId,
    ) -> Result<Option<f64>, StatError> {
        self.sources
            .baseline(class_id, attribute)
            .map_err(source_error)
    }

    fn personal_override(
        &self,
        character: CharacterId,
        attribute: AttributeId,
    ) -> Result<Option<f64>, StatError> {
        self.sources
            .override_value(character, attribute)
            .map_err(source_error)
    }
}

impl EquipmentOracle for Repositories {
    fn equipment_modifiers(
        &self,
        character: CharacterId,
        attribute: AttributeId,
    ) -> Result<Vec<Modifier>, StatError> {
        let items = self
            .equipment
            .items_for_character(character)
            .map_err(source_error)?;

        let mut modifiers = Vec::new();
        for item in items.iter().filter(|item| item.is_active()) {
            let granted = self
                .equipment
                .definition_modifiers(item.definition)
                .map_err(source_error)?;
            modifiers.extend(granted.into_iter().filter(|m| m.attribute == attribute));
        }
        Ok(modifiers)
    }
}

impl EffectOracle for Repositories {
    fn effect_modifiers(
        &self,
        character: CharacterId,
        attribute: AttributeId,
    ) -> Result<Vec<Modifier>, StatError> {
        let effects = self
            .effects
            .active_for_character(character, Utc::now())
            .map_err(source_error)?;
        Ok(effects
            .into_iter()
            .map(|effect| effect.modifier)
            .filter(|m| m.attribute == attribute)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stats_core::{ItemDefinitionId, ItemInstance, ItemInstanceId};

    #[test]
    fn only_equipped_unbroken_items_contribute() {
        let repos = Repositories::in_memory();
        let hero = CharacterId(1);
        let force = AttributeId(1);
        repos
            .equipment
            .set_definition_modifiers(
                ItemDefinitionId(1),
                vec![Modifier::flat(force, 3.0), Modifier::percent(AttributeId(2), 10.0)],
            )
            .unwrap();

        let mut item = ItemInstance {
            id: ItemInstanceId(1),
            owner: hero,
            definition: ItemDefinitionId(1),
            equipped: true,
            broken: false,
        };
        repos.equipment.save_item(item).unwrap();
        assert_eq!(
            repos.equipment_modifiers(hero, force).unwrap(),
            vec![Modifier::flat(force, 3.0)]
        );

        item.broken = true;
        repos.equipment.save_item(item).unwrap();
        assert!(repos.equipment_modifiers(hero, force).unwrap().is_empty());
    }
}
