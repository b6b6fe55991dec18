//! Attribute catalog events.

use chrono::Utc;
use stats_core::AttributeId;
use tracing::debug;

use super::{AttributeField, InvalidationRouter, RouteOutcome};
use crate::api::Result;
use crate::repository::CacheKey;
use crate::workers::BatchScope;

impl InvalidationRouter {
    /// Backfills source rows for a new base attribute and seeds stale
    /// placeholders so every character recomputes it on first read.
    pub(super) fn attribute_created(
        &self,
        attribute: AttributeId,
        reason: &str,
    ) -> Result<RouteOutcome> {
        let attribute = self.attribute(attribute)?;
        let repos = self.manager.repositories();
        let characters = repos.characters.list_ids()?;

        if attribute.kind.is_base() {
            for class in repos.characters.list_classes()? {
                repos
                    .sources
                    .ensure_baseline(class.id, attribute.id, attribute.default_value)?;
            }
            for &character in &characters {
                repos.sources.ensure_override(character, attribute.id)?;
            }
        }

        let now = Utc::now();
        let placeholder = attribute.clamp(attribute.default_value);
        for &character in &characters {
            repos
                .cache
                .ensure_stale(CacheKey::new(character, attribute.id), placeholder, now)?;
        }
        debug!(
            "Seeded {} stale entries for new attribute '{}' ({})",
            characters.len(),
            attribute.slug,
            reason
        );

        Ok(RouteOutcome {
            invalidated: characters.len(),
            ..RouteOutcome::default()
        })
    }

    /// Invalidates and batch-recomputes an attribute and its dependents when
    /// a value-affecting field changed. Cosmetic edits are ignored.
    pub(super) fn attribute_updated(
        &self,
        attribute: AttributeId,
        changed: &[AttributeField],
        reason: &str,
    ) -> Result<RouteOutcome> {
        if !changed.iter().any(|field| field.affects_values()) {
            debug!("{} changed only cosmetic fields {:?}", attribute, changed);
            return Ok(RouteOutcome::default());
        }

        let attribute = self.attribute(attribute)?;
        let mut outcome = RouteOutcome {
            invalidated: self
                .manager
                .invalidate_all_for_attribute(attribute.id, reason)?,
            ..RouteOutcome::default()
        };
        let dependents = self
            .manager
            .invalidate_dependents(None, &attribute.slug, reason)?;
        outcome.invalidated += dependents.entries;

        let targets =
            std::iter::once(attribute.id).chain(dependents.attributes.iter().map(|a| a.id));
        self.queue_batches(targets, BatchScope::AllCharacters, reason, &mut outcome)?;
        Ok(outcome)
    }

    /// Removes every cache, baseline and override row of a deleted attribute
    /// and invalidates formulas that read it.
    pub(super) fn attribute_deleted(
        &self,
        attribute: AttributeId,
        slug: &str,
        reason: &str,
    ) -> Result<RouteOutcome> {
        let removed_cache = self.manager.cleanup_attribute(attribute)?;
        let removed_sources = self
            .manager
            .repositories()
            .sources
            .delete_by_attribute(attribute)?;
        let dependents = self.manager.invalidate_dependents(None, slug, reason)?;

        Ok(RouteOutcome {
            invalidated: dependents.entries,
            removed: removed_cache + removed_sources,
            ..RouteOutcome::default()
        })
    }
}
