//! Class baseline, personal override and character lifecycle events.

use stats_core::{AttributeId, CharacterId, ClassId, StatError};
use tracing::debug;

use super::{InvalidationRouter, RouteOutcome};
use crate::api::Result;
use crate::repository::CacheKey;
use crate::workers::BatchScope;

impl InvalidationRouter {
    /// Invalidates the attribute and its dependents for every character of
    /// the class, then batch-recomputes them scoped to that class.
    pub(super) fn class_baseline_changed(
        &self,
        class_id: ClassId,
        attribute: AttributeId,
        reason: &str,
    ) -> Result<RouteOutcome> {
        let attribute = self.attribute(attribute)?;
        let characters = self
            .manager
            .repositories()
            .characters
            .list_by_class(class_id)?;

        let mut outcome = RouteOutcome::default();
        let mut dependents = Vec::new();
        for &character in &characters {
            outcome.invalidated +=
                usize::from(self.manager.invalidate_one(character, attribute.id, reason)?);
            let invalidated =
                self.manager
                    .invalidate_dependents(Some(character), &attribute.slug, reason)?;
            outcome.invalidated += invalidated.entries;
            dependents = invalidated.attributes;
        }

        let targets = std::iter::once(attribute.id).chain(dependents.iter().map(|a| a.id));
        self.queue_batches(targets, BatchScope::Class(class_id), reason, &mut outcome)?;
        Ok(outcome)
    }

    /// Recomputes the overridden attribute and its dependents for that
    /// character only.
    pub(super) fn personal_override_changed(
        &self,
        character: CharacterId,
        attribute: AttributeId,
        reason: &str,
    ) -> Result<RouteOutcome> {
        let attribute = self.attribute(attribute)?;
        if !attribute.kind.accepts_override() {
            return Err(StatError::OverrideNotAllowed {
                slug: attribute.slug,
                kind: attribute.kind.to_string(),
            }
            .into());
        }

        let mut outcome = RouteOutcome {
            invalidated: usize::from(self.manager.invalidate_one(character, attribute.id, reason)?),
            ..RouteOutcome::default()
        };
        let dependents =
            self.manager
                .invalidate_dependents(Some(character), &attribute.slug, reason)?;
        outcome.invalidated += dependents.entries;

        let targets: Vec<AttributeId> = std::iter::once(attribute.id)
            .chain(dependents.attributes.iter().map(|a| a.id))
            .collect();
        outcome.recomputed = self
            .manager
            .trigger_immediate_recalculation(character, &targets)?
            .into_iter()
            .map(|(attribute, _)| CacheKey::new(character, attribute))
            .collect();
        Ok(outcome)
    }

    /// Drops a deleted character's cache entries and overrides.
    pub(super) fn character_deleted(
        &self,
        character: CharacterId,
        reason: &str,
    ) -> Result<RouteOutcome> {
        let removed_cache = self.manager.cleanup_character(character)?;
        let removed_overrides = self
            .manager
            .repositories()
            .sources
            .delete_overrides_for_character(character)?;
        debug!(
            "Removed {} cache entries and {} overrides of {} ({})",
            removed_cache, removed_overrides, character, reason
        );

        Ok(RouteOutcome {
            removed: removed_cache + removed_overrides,
            ..RouteOutcome::default()
        })
    }
}
