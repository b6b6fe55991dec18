//! Cache manager implementation.
//!
//! Reads go through the cache: a fresh entry is returned as-is, a stale entry
//! or a miss is evaluated synchronously, written back and returned. Derived
//! formulas resolve their dependencies through the same path, so they always
//! see fresh cached inputs.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use stats_core::{
    Attribute, AttributeId, AttributeKind, CharacterId, DependencyResolver, Evaluator,
    FormulaRegistry, StatError,
};
use tracing::{debug, info, warn};

use super::locks::KeyLocks;
use crate::api::{Result, RuntimeError};
use crate::config::RuntimeConfig;
use crate::events::{BatchEvent, CacheEvent, EventBus, InvalidationScope};
use crate::oracle::Repositories;
use crate::repository::{CacheKey, CacheStatistics};
use crate::workers::{BatchJob, BatchScope, JobId, RecalculationQueue};

/// One visible attribute of a character with its final value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub attribute: AttributeId,
    pub slug: String,
    pub label: String,
    pub kind: AttributeKind,
    pub value: f64,
    pub display_order: i32,
}

/// Result of invalidating an attribute's derived dependents.
#[derive(Clone, Debug, Default)]
pub struct DependentInvalidation {
    /// Dependents in dependency order.
    pub attributes: Vec<Attribute>,
    /// Cache entries marked stale.
    pub entries: usize,
}

/// Single entry point for consumers of cached attribute values.
pub struct CacheManager {
    repos: Repositories,
    formulas: Arc<FormulaRegistry>,
    locks: KeyLocks,
    queue: Arc<dyn RecalculationQueue>,
    bus: EventBus,
    config: RuntimeConfig,
    next_job: AtomicU64,
}

impl CacheManager {
    pub fn new(
        repos: Repositories,
        formulas: Arc<FormulaRegistry>,
        queue: Arc<dyn RecalculationQueue>,
        bus: EventBus,
        config: RuntimeConfig,
    ) -> Self {
        Self {
            repos,
            formulas,
            locks: KeyLocks::new(),
            queue,
            bus,
            config,
            next_job: AtomicU64::new(0),
        }
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repos
    }

    pub fn formulas(&self) -> &FormulaRegistry {
        &self.formulas
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    /// Returns the final value of `attribute` for `character`.
    ///
    /// A fresh cache entry is authoritative. Otherwise the value is evaluated
    /// under the key's lock, written back with `stale = false` and returned.
    /// Evaluation errors are returned and nothing is cached.
    pub fn get_final_value(&self, character: CharacterId, attribute: AttributeId) -> Result<f64> {
        let key = CacheKey::new(character, attribute);
        if let Some(entry) = self.repos.cache.get(key)?
            && entry.is_fresh()
        {
            debug!(%key, "cache hit");
            return Ok(entry.final_value);
        }

        self.locks.with_key(key, || {
            // Another caller may have recomputed while we waited.
            if let Some(entry) = self.repos.cache.get(key)?
                && entry.is_fresh()
            {
                return Ok(entry.final_value);
            }
            self.recompute_locked(key)
        })
    }

    /// Every visible attribute of `character`, ordered by display order then
    /// slug. Stale or missing entries are recomputed first.
    pub fn get_all_visible_values(&self, character: CharacterId) -> Result<Vec<AttributeValue>> {
        if self.repos.characters.get(character)?.is_none() {
            return Err(StatError::CharacterNotFound(character).into());
        }

        let cached: HashMap<AttributeId, f64> = self
            .repos
            .cache
            .entries_for_character(character)?
            .into_iter()
            .filter(|entry| entry.is_fresh())
            .map(|entry| (entry.key.attribute, entry.final_value))
            .collect();

        let mut values = Vec::new();
        for attribute in self.repos.attributes.list()? {
            if !attribute.visible {
                continue;
            }
            let value = match cached.get(&attribute.id) {
                Some(value) => *value,
                None => self.get_final_value(character, attribute.id)?,
            };
            values.push(AttributeValue {
                attribute: attribute.id,
                slug: attribute.slug,
                label: attribute.label,
                kind: attribute.kind,
                value,
                display_order: attribute.display_order,
            });
        }
        Ok(values)
    }

    /// Marks one entry stale. Returns whether an entry existed.
    pub fn invalidate_one(
        &self,
        character: CharacterId,
        attribute: AttributeId,
        reason: &str,
    ) -> Result<bool> {
        let key = CacheKey::new(character, attribute);
        let existed = self.repos.cache.mark_stale(key)?;
        debug!(%key, reason, existed, "invalidated entry");
        self.bus.publish(CacheEvent::Invalidated {
            scope: InvalidationScope::Entry(key),
            count: usize::from(existed),
            reason: reason.to_owned(),
        });
        Ok(existed)
    }

    /// Marks every entry of `character` stale. Returns the count.
    pub fn invalidate_all_for_character(
        &self,
        character: CharacterId,
        reason: &str,
    ) -> Result<usize> {
        let count = self.repos.cache.mark_stale_for_character(character)?;
        debug!(%character, reason, count, "invalidated character");
        self.bus.publish(CacheEvent::Invalidated {
            scope: InvalidationScope::Character(character),
            count,
            reason: reason.to_owned(),
        });
        Ok(count)
    }

    /// Marks every entry of `attribute` stale. Returns the count.
    pub fn invalidate_all_for_attribute(
        &self,
        attribute: AttributeId,
        reason: &str,
    ) -> Result<usize> {
        let count = self.repos.cache.mark_stale_for_attribute(attribute)?;
        debug!(%attribute, reason, count, "invalidated attribute");
        self.bus.publish(CacheEvent::Invalidated {
            scope: InvalidationScope::Attribute(attribute),
            count,
            reason: reason.to_owned(),
        });
        Ok(count)
    }

    /// Marks stale every formula attribute that transitively reads `slug`,
    /// for one character or for all of them.
    pub fn invalidate_dependents(
        &self,
        character: Option<CharacterId>,
        slug: &str,
        reason: &str,
    ) -> Result<DependentInvalidation> {
        let mut result = DependentInvalidation::default();
        for slug in self.formulas.dependents_of(slug) {
            let Some(dependent) = self.repos.attributes.get_by_slug(&slug)? else {
                continue;
            };
            result.entries += match character {
                Some(character) => {
                    usize::from(self.invalidate_one(character, dependent.id, reason)?)
                }
                None => self.invalidate_all_for_attribute(dependent.id, reason)?,
            };
            result.attributes.push(dependent);
        }
        Ok(result)
    }

    /// Recomputes `attributes` for `character` now, even if fresh.
    ///
    /// An empty list means every attribute. Base attributes are recomputed
    /// before formula attributes, which follow dependency order.
    pub fn trigger_immediate_recalculation(
        &self,
        character: CharacterId,
        attributes: &[AttributeId],
    ) -> Result<Vec<(AttributeId, f64)>> {
        let selected = if attributes.is_empty() {
            self.repos.attributes.list()?
        } else {
            attributes
                .iter()
                .map(|id| {
                    self.repos
                        .attributes
                        .get(*id)?
                        .ok_or(RuntimeError::Stat(StatError::AttributeNotFound(*id)))
                })
                .collect::<Result<Vec<_>>>()?
        };

        let mut values = Vec::with_capacity(selected.len());
        for attribute in self.recalculation_order(selected) {
            let key = CacheKey::new(character, attribute.id);
            let value = self.locks.with_key(key, || self.recompute_locked(key))?;
            values.push((attribute.id, value));
        }
        Ok(values)
    }

    /// Enqueues a batch job for `attribute`. Returns immediately.
    ///
    /// `batch_size` falls back to the configured default; it is never 0.
    pub fn trigger_batch_recalculation(
        &self,
        attribute: AttributeId,
        reason: &str,
        batch_size: Option<usize>,
        scope: BatchScope,
    ) -> Result<JobId> {
        let id = JobId(self.next_job.fetch_add(1, Ordering::Relaxed) + 1);
        let job = BatchJob {
            id,
            attribute,
            reason: reason.to_owned(),
            batch_size: batch_size.unwrap_or(self.config.default_batch_size).max(1),
            scope,
        };

        self.queue.enqueue(job)?;
        info!(%id, %attribute, reason, ?scope, "batch recalculation queued");
        self.bus.publish(BatchEvent::Queued {
            job: id,
            attribute,
            reason: reason.to_owned(),
        });
        Ok(id)
    }

    /// Deletes every cache entry of `attribute`.
    pub fn cleanup_attribute(&self, attribute: AttributeId) -> Result<usize> {
        let count = self.repos.cache.delete_by_attribute(attribute)?;
        debug!(%attribute, count, "removed cache entries");
        self.bus.publish(CacheEvent::Removed {
            scope: InvalidationScope::Attribute(attribute),
            count,
        });
        Ok(count)
    }

    /// Deletes every cache entry of `character`.
    pub fn cleanup_character(&self, character: CharacterId) -> Result<usize> {
        let count = self.repos.cache.delete_by_character(character)?;
        debug!(%character, count, "removed cache entries");
        self.bus.publish(CacheEvent::Removed {
            scope: InvalidationScope::Character(character),
            count,
        });
        Ok(count)
    }

    /// Recomputes up to `limit` stale entries of `attribute`, oldest
    /// character first. Entries that fail to evaluate stay stale and are
    /// logged. Returns how many entries were refreshed.
    pub fn refresh_stale(&self, attribute: AttributeId, limit: usize) -> Result<usize> {
        let page = self.repos.cache.list_stale(attribute, limit, 0)?;
        let mut refreshed = 0;
        for entry in page {
            match self.get_final_value(entry.key.character, attribute) {
                Ok(_) => refreshed += 1,
                Err(e) => warn!(key = %entry.key, "stale entry not refreshed: {}", e),
            }
        }
        if refreshed > 0 {
            debug!(%attribute, refreshed, "refreshed stale entries");
        }
        Ok(refreshed)
    }

    pub fn cache_statistics(&self) -> Result<CacheStatistics> {
        Ok(self.repos.cache.statistics()?)
    }

    /// Evaluates `key` against the current sources without writing it.
    pub(crate) fn evaluate(&self, key: CacheKey) -> Result<f64> {
        let evaluator = Evaluator::new(self.repos.as_stat_env(), &self.formulas);
        Ok(evaluator.evaluate(key.character, key.attribute, self)?)
    }

    /// Orders attributes so every value is computed after its inputs.
    pub(crate) fn recalculation_order(&self, mut attributes: Vec<Attribute>) -> Vec<Attribute> {
        let rank: HashMap<String, usize> = self
            .formulas
            .topological_order()
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, slug)| (slug, index))
            .collect();

        attributes.sort_by_key(|attribute| {
            if attribute.kind.is_base() {
                (0, 0)
            } else {
                (1, rank.get(&attribute.slug).copied().unwrap_or(usize::MAX))
            }
        });
        attributes
    }

    /// Caller holds the key's lock.
    fn recompute_locked(&self, key: CacheKey) -> Result<f64> {
        let value = self.evaluate(key)?;
        self.repos.cache.upsert(key, value, Utc::now())?;
        debug!(%key, value, "recomputed");
        self.bus.publish(CacheEvent::Recomputed { key, value });
        Ok(value)
    }
}

impl DependencyResolver for CacheManager {
    fn resolve(&self, character: CharacterId, attribute: &Attribute) -> std::result::Result<f64, StatError> {
        self.get_final_value(character, attribute.id)
            .map_err(StatError::from)
    }
}
