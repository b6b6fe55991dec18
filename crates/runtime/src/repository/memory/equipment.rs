//! In-memory EquipmentRepository implementation.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use stats_core::{CharacterId, ItemDefinitionId, ItemInstance, ItemInstanceId, Modifier};

use crate::repository::{EquipmentRepository, RepositoryError, Result};

#[derive(Default)]
pub struct InMemoryEquipmentRepository {
    items: RwLock<BTreeMap<ItemInstanceId, ItemInstance>>,
    definitions: RwLock<HashMap<ItemDefinitionId, Vec<Modifier>>>,
}

impl InMemoryEquipmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EquipmentRepository for InMemoryEquipmentRepository {
    fn item(&self, id: ItemInstanceId) -> Result<Option<ItemInstance>> {
        let items = self
            .items
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(items.get(&id).copied())
    }

    fn save_item(&self, item: ItemInstance) -> Result<()> {
        let mut items = self
            .items
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        items.insert(item.id, item);
        Ok(())
    }

    fn items_for_character(&self, character: CharacterId) -> Result<Vec<ItemInstance>> {
        let items = self
            .items
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(items
            .values()
            .filter(|item| item.owner == character)
            .copied()
            .collect())
    }

    fn definition_modifiers(&self, definition: ItemDefinitionId) -> Result<Vec<Modifier>> {
        let definitions = self
            .definitions
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(definitions.get(&definition).cloned().unwrap_or_default())
    }

    fn set_definition_modifiers(
        &self,
        definition: ItemDefinitionId,
        modifiers: Vec<Modifier>,
    ) -> Result<()> {
        let mut definitions = self
            .definitions
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        definitions.insert(definition, modifiers);
        Ok(())
    }
}
