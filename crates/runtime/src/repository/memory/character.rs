//! In-memory CharacterRepository implementation.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use stats_core::{Character, CharacterId, ClassId};

use crate::repository::{CharacterClass, CharacterRepository, RepositoryError, Result};

/// Characters ordered by id, plus the class table.
#[derive(Default)]
pub struct InMemoryCharacterRepository {
    characters: RwLock<BTreeMap<CharacterId, Character>>,
    classes: RwLock<HashMap<ClassId, CharacterClass>>,
}

impl InMemoryCharacterRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CharacterRepository for InMemoryCharacterRepository {
    fn get(&self, id: CharacterId) -> Result<Option<Character>> {
        let characters = self
            .characters
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(characters.get(&id).cloned())
    }

    fn save(&self, character: Character) -> Result<()> {
        let mut characters = self
            .characters
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        characters.insert(character.id, character);
        Ok(())
    }

    fn delete(&self, id: CharacterId) -> Result<bool> {
        let mut characters = self
            .characters
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(characters.remove(&id).is_some())
    }

    fn list_ids(&self) -> Result<Vec<CharacterId>> {
        let characters = self
            .characters
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(characters.keys().copied().collect())
    }

    fn list_by_class(&self, class_id: ClassId) -> Result<Vec<CharacterId>> {
        let characters = self
            .characters
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(characters
            .values()
            .filter(|c| c.class_id == class_id)
            .map(|c| c.id)
            .collect())
    }

    fn save_class(&self, class: CharacterClass) -> Result<()> {
        let mut classes = self
            .classes
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        classes.insert(class.id, class);
        Ok(())
    }

    fn list_classes(&self) -> Result<Vec<CharacterClass>> {
        let classes = self
            .classes
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut list: Vec<CharacterClass> = classes.values().cloned().collect();
        list.sort_by_key(|c| c.id);
        Ok(list)
    }
}
