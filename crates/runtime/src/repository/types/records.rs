//! Source records that only the runtime persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stats_core::{CharacterId, ClassId, Modifier};

/// A playable class; owns one baseline row per base attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterClass {
    pub id: ClassId,
    pub name: String,
}

impl CharacterClass {
    pub fn new(id: ClassId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectId(pub u64);

/// Time-bounded modifier applied to one character (buff, debuff, potion).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemporaryEffect {
    pub id: EffectId,
    pub character: CharacterId,
    pub modifier: Modifier,
    /// `None` lasts until removed.
    pub expires_at: Option<DateTime<Utc>>,
}

impl TemporaryEffect {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| now < expires_at)
    }
}
