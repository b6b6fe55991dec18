//! In-memory SourceRepository implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use stats_core::{AttributeId, CharacterId, ClassId};

use crate::repository::{RepositoryError, Result, SourceRepository};

#[derive(Default)]
pub struct InMemorySourceRepository {
    baselines: RwLock<HashMap<(ClassId, AttributeId), f64>>,
    overrides: RwLock<HashMap<(CharacterId, AttributeId), f64>>,
}

impl InMemorySourceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SourceRepository for InMemorySourceRepository {
    fn baseline(&self, class_id: ClassId, attribute: AttributeId) -> Result<Option<f64>> {
        let baselines = self
            .baselines
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(baselines.get(&(class_id, attribute)).copied())
    }

    fn set_baseline(&self, class_id: ClassId, attribute: AttributeId, value: f64) -> Result<()> {
        let mut baselines = self
            .baselines
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        baselines.insert((class_id, attribute), value);
        Ok(())
    }

    fn ensure_baseline(
        &self,
        class_id: ClassId,
        attribute: AttributeId,
        value: f64,
    ) -> Result<bool> {
        let mut baselines = self
            .baselines
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        if baselines.contains_key(&(class_id, attribute)) {
            return Ok(false);
        }
        baselines.insert((class_id, attribute), value);
        Ok(true)
    }

    fn override_value(
        &self,
        character: CharacterId,
        attribute: AttributeId,
    ) -> Result<Option<f64>> {
        let overrides = self
            .overrides
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(overrides.get(&(character, attribute)).copied())
    }

    fn set_override(
        &self,
        character: CharacterId,
        attribute: AttributeId,
        value: f64,
    ) -> Result<()> {
        let mut overrides = self
            .overrides
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        overrides.insert((character, attribute), value);
        Ok(())
    }

    fn ensure_override(&self, character: CharacterId, attribute: AttributeId) -> Result<bool> {
        let mut overrides = self
            .overrides
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        if overrides.contains_key(&(character, attribute)) {
            return Ok(false);
        }
        overrides.insert((character, attribute), 0.0);
        Ok(true)
    }

    fn baselines_for_attribute(&self, attribute: AttributeId) -> Result<Vec<(ClassId, f64)>> {
        let baselines = self
            .baselines
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut rows: Vec<(ClassId, f64)> = baselines
            .iter()
            .filter(|((_, attr), _)| *attr == attribute)
            .map(|((class_id, _), value)| (*class_id, *value))
            .collect();
        rows.sort_by_key(|(class_id, _)| *class_id);
        Ok(rows)
    }

    fn overrides_for_attribute(
        &self,
        attribute: AttributeId,
    ) -> Result<Vec<(CharacterId, f64)>> {
        let overrides = self
            .overrides
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut rows: Vec<(CharacterId, f64)> = overrides
            .iter()
            .filter(|((_, attr), _)| *attr == attribute)
            .map(|((character, _), value)| (*character, *value))
            .collect();
        rows.sort_by_key(|(character, _)| *character);
        Ok(rows)
    }

    fn delete_by_attribute(&self, attribute: AttributeId) -> Result<usize> {
        let mut baselines = self
            .baselines
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut overrides = self
            .overrides
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        let before = baselines.len() + overrides.len();
        baselines.retain(|(_, attr), _| *attr != attribute);
        overrides.retain(|(_, attr), _| *attr != attribute);
        Ok(before - baselines.len() - overrides.len())
    }

    fn delete_overrides_for_character(&self, character: CharacterId) -> Result<usize> {
        let mut overrides = self
            .overrides
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let before = overrides.len();
        overrides.retain(|(owner, _), _| *owner != character);
        Ok(before - overrides.len())
    }
}
