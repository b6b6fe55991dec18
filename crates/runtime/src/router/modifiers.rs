//! Equipment and temporary-effect events.
//!
//! A modifier change recomputes the modified attributes and their formula
//! dependents for the character. Every other derived attribute of the
//! character is marked stale and recomputed lazily.

use std::collections::BTreeSet;

use stats_core::{AttributeId, CharacterId, ItemInstanceId};
use tracing::warn;

use super::{InvalidationRouter, RouteOutcome};
use crate::api::{Result, RuntimeError};
use crate::repository::CacheKey;

impl InvalidationRouter {
    pub(super) fn equipment_changed(
        &self,
        character: CharacterId,
        item: ItemInstanceId,
        reason: &str,
    ) -> Result<RouteOutcome> {
        let equipment = &self.manager.repositories().equipment;
        let item = equipment.item(item)?.ok_or(RuntimeError::ItemNotFound(item))?;
        let modified: BTreeSet<AttributeId> = equipment
            .definition_modifiers(item.definition)?
            .iter()
            .map(|modifier| modifier.attribute)
            .collect();

        self.modifiers_changed(character, modified, reason)
    }

    pub(super) fn effect_changed(
        &self,
        character: CharacterId,
        attribute: AttributeId,
        reason: &str,
    ) -> Result<RouteOutcome> {
        self.modifiers_changed(character, BTreeSet::from([attribute]), reason)
    }

    fn modifiers_changed(
        &self,
        character: CharacterId,
        modified: BTreeSet<AttributeId>,
        reason: &str,
    ) -> Result<RouteOutcome> {
        let mut outcome = RouteOutcome::default();

        for attribute in self.manager.repositories().attributes.list()? {
            if attribute.kind.is_derived() {
                outcome.invalidated +=
                    usize::from(self.manager.invalidate_one(character, attribute.id, reason)?);
            }
        }

        let mut targets = BTreeSet::new();
        for id in modified {
            let Some(attribute) = self.manager.repositories().attributes.get(id)? else {
                warn!("Modifier targets unknown {}, skipping", id);
                continue;
            };
            outcome.invalidated += usize::from(self.manager.invalidate_one(character, id, reason)?);
            let dependents =
                self.manager
                    .invalidate_dependents(Some(character), &attribute.slug, reason)?;
            outcome.invalidated += dependents.entries;
            targets.insert(id);
            targets.extend(dependents.attributes.iter().map(|a| a.id));
        }

        if !targets.is_empty() {
            let targets: Vec<AttributeId> = targets.into_iter().collect();
            outcome.recomputed = self
                .manager
                .trigger_immediate_recalculation(character, &targets)?
                .into_iter()
                .map(|(attribute, _)| CacheKey::new(character, attribute))
                .collect();
        }
        Ok(outcome)
    }
}
