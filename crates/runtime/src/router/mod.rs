//! Invalidation router: maps domain events onto cache operations.
//!
//! Every [`DomainEvent`] variant is handled by an exhaustive `match` in
//! [`InvalidationRouter::dispatch`]; handlers are grouped by the data they
//! react to:
//! - [`catalog`] for attribute creation, edits and deletion
//! - [`sources`] for class baselines, personal overrides and character deletion
//! - [`modifiers`] for equipment and temporary effects

mod catalog;
mod events;
mod modifiers;
mod sources;

pub use events::{AttributeField, DomainEvent};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stats_core::{Attribute, AttributeId, StatError};
use tracing::{debug, warn};

use crate::api::Result;
use crate::cache::CacheManager;
use crate::repository::CacheKey;
use crate::workers::{BatchScope, JobId};

/// What a dispatch did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteOutcome {
    /// Cache entries marked stale (placeholders included).
    pub invalidated: usize,
    /// Entries recomputed synchronously, in recompute order.
    pub recomputed: Vec<CacheKey>,
    /// Batch jobs queued.
    pub batch_jobs: Vec<JobId>,
    /// Cache and source rows deleted.
    pub removed: usize,
}

/// Consumer of domain events.
pub trait DomainEventHandler: Send + Sync {
    fn handle(&self, event: DomainEvent) -> Result<RouteOutcome>;
}

/// Routes domain events to the cache manager.
#[derive(Clone)]
pub struct InvalidationRouter {
    manager: Arc<CacheManager>,
}

impl InvalidationRouter {
    pub fn new(manager: Arc<CacheManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &CacheManager {
        &self.manager
    }

    pub fn dispatch(&self, event: DomainEvent) -> Result<RouteOutcome> {
        let reason = event.name();
        let outcome = match event {
            DomainEvent::AttributeCreated { attribute } => {
                self.attribute_created(attribute, reason)
            }
            DomainEvent::AttributeUpdated { attribute, changed } => {
                self.attribute_updated(attribute, &changed, reason)
            }
            DomainEvent::AttributeDeleted { attribute, slug } => {
                self.attribute_deleted(attribute, &slug, reason)
            }
            DomainEvent::ClassBaselineChanged {
                class_id,
                attribute,
            } => self.class_baseline_changed(class_id, attribute, reason),
            DomainEvent::PersonalOverrideChanged {
                character,
                attribute,
            } => self.personal_override_changed(character, attribute, reason),
            DomainEvent::ItemEquipped { character, item }
            | DomainEvent::ItemUnequipped { character, item }
            | DomainEvent::ItemBroken { character, item } => {
                self.equipment_changed(character, item, reason)
            }
            DomainEvent::EffectChanged {
                character,
                attribute,
            } => self.effect_changed(character, attribute, reason),
            DomainEvent::CharacterDeleted { character } => {
                self.character_deleted(character, reason)
            }
        }?;

        debug!(
            "Routed {}: {} invalidated, {} recomputed, {} batch jobs, {} removed",
            reason,
            outcome.invalidated,
            outcome.recomputed.len(),
            outcome.batch_jobs.len(),
            outcome.removed
        );
        Ok(outcome)
    }

    /// Queues one batch job per attribute. A refused enqueue does not stop
    /// the rest; attributes left unscheduled stay stale until their next
    /// read, and the first enqueue error is returned.
    fn queue_batches(
        &self,
        attributes: impl IntoIterator<Item = AttributeId>,
        scope: BatchScope,
        reason: &str,
        outcome: &mut RouteOutcome,
    ) -> Result<()> {
        let mut unscheduled = Vec::new();
        let mut first_error = None;
        for id in attributes {
            match self.manager.trigger_batch_recalculation(id, reason, None, scope) {
                Ok(job) => outcome.batch_jobs.push(job),
                Err(e) => {
                    unscheduled.push(id);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            None => Ok(()),
            Some(e) => {
                warn!(
                    ?unscheduled,
                    queued = outcome.batch_jobs.len(),
                    "Batch recalculation not queued ({}): {}; entries stay stale until read",
                    reason,
                    e
                );
                Err(e)
            }
        }
    }

    fn attribute(&self, id: AttributeId) -> Result<Attribute> {
        self.manager
            .repositories()
            .attributes
            .get(id)?
            .ok_or_else(|| StatError::AttributeNotFound(id).into())
    }
}

impl DomainEventHandler for InvalidationRouter {
    fn handle(&self, event: DomainEvent) -> Result<RouteOutcome> {
        self.dispatch(event)
    }
}
