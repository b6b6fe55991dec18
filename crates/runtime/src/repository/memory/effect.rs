//! In-memory EffectRepository implementation.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use stats_core::CharacterId;

use crate::repository::{EffectId, EffectRepository, RepositoryError, Result, TemporaryEffect};

#[derive(Default)]
pub struct InMemoryEffectRepository {
    effects: RwLock<BTreeMap<EffectId, TemporaryEffect>>,
}

impl InMemoryEffectRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EffectRepository for InMemoryEffectRepository {
    fn apply(&self, effect: TemporaryEffect) -> Result<()> {
        let mut effects = self
            .effects
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        effects.insert(effect.id, effect);
        Ok(())
    }

    fn active_for_character(
        &self,
        character: CharacterId,
        now: DateTime<Utc>,
    ) -> Result<Vec<TemporaryEffect>> {
        let effects = self
            .effects
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(effects
            .values()
            .filter(|effect| effect.character == character && effect.is_active_at(now))
            .cloned()
            .collect())
    }
}
