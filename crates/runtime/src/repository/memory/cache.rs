//! In-memory CacheStore implementation.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use stats_core::{AttributeId, CharacterId};

use crate::repository::{
    CacheEntry, CacheKey, CacheStatistics, CacheStore, RepositoryError, Result,
};

/// Cache entries ordered by (character, attribute).
///
/// `upsert_many` holds the write lock for the whole chunk, so a chunk is
/// visible to readers all at once.
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<BTreeMap<CacheKey, CacheEntry>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl CacheStore for InMemoryCacheStore {
    fn get(&self, key: CacheKey) -> Result<Option<CacheEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(entries.get(&key).cloned())
    }

    fn upsert(&self, key: CacheKey, value: f64, computed_at: DateTime<Utc>) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        entries.insert(key, CacheEntry::fresh(key, value, computed_at));
        Ok(())
    }

    fn upsert_many(&self, values: &[(CacheKey, f64)], computed_at: DateTime<Utc>) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        for (key, value) in values {
            entries.insert(*key, CacheEntry::fresh(*key, *value, computed_at));
        }
        Ok(())
    }

    fn mark_stale(&self, key: CacheKey) -> Result<bool> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        match entries.get_mut(&key) {
            Some(entry) => {
                entry.stale = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn ensure_stale(&self, key: CacheKey, placeholder: f64, now: DateTime<Utc>) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        entries
            .entry(key)
            .and_modify(|entry| entry.stale = true)
            .or_insert_with(|| CacheEntry {
                key,
                final_value: placeholder,
                stale: true,
                computed_at: now,
            });
        Ok(())
    }

    fn mark_stale_for_character(&self, character: CharacterId) -> Result<usize> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut count = 0;
        for entry in entries.values_mut().filter(|e| e.key.character == character) {
            entry.stale = true;
            count += 1;
        }
        Ok(count)
    }

    fn mark_stale_for_attribute(&self, attribute: AttributeId) -> Result<usize> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut count = 0;
        for entry in entries.values_mut().filter(|e| e.key.attribute == attribute) {
            entry.stale = true;
            count += 1;
        }
        Ok(count)
    }

    fn delete_by_attribute(&self, attribute: AttributeId) -> Result<usize> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let before = entries.len();
        entries.retain(|key, _| key.attribute != attribute);
        Ok(before - entries.len())
    }

    fn delete_by_character(&self, character: CharacterId) -> Result<usize> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let before = entries.len();
        entries.retain(|key, _| key.character != character);
        Ok(before - entries.len())
    }

    fn list_stale(
        &self,
        attribute: AttributeId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CacheEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(entries
            .values()
            .filter(|e| e.key.attribute == attribute && e.stale)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn entries_for_character(&self, character: CharacterId) -> Result<Vec<CacheEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(entries
            .range(
                CacheKey::new(character, AttributeId(u32::MIN))
                    ..=CacheKey::new(character, AttributeId(u32::MAX)),
            )
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    fn entries_for_attribute(&self, attribute: AttributeId) -> Result<Vec<CacheEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(entries
            .values()
            .filter(|e| e.key.attribute == attribute)
            .cloned()
            .collect())
    }

    fn statistics(&self) -> Result<CacheStatistics> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(CacheStatistics::from_entries(entries.values()))
    }
}
