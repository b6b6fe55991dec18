//! In-memory AttributeRepository implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use stats_core::{Attribute, AttributeId};

use crate::repository::{AttributeRepository, RepositoryError, Result};

/// Attribute catalog indexed by id.
#[derive(Default)]
pub struct InMemoryAttributeRepository {
    attributes: RwLock<HashMap<AttributeId, Attribute>>,
}

impl InMemoryAttributeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttributeRepository for InMemoryAttributeRepository {
    fn get(&self, id: AttributeId) -> Result<Option<Attribute>> {
        let attributes = self
            .attributes
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(attributes.get(&id).cloned())
    }

    fn get_by_slug(&self, slug: &str) -> Result<Option<Attribute>> {
        let attributes = self
            .attributes
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(attributes.values().find(|a| a.slug == slug).cloned())
    }

    fn list(&self) -> Result<Vec<Attribute>> {
        let attributes = self
            .attributes
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut list: Vec<Attribute> = attributes.values().cloned().collect();
        list.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        Ok(list)
    }

    fn save(&self, attribute: Attribute) -> Result<()> {
        let mut attributes = self
            .attributes
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        if attributes
            .values()
            .any(|a| a.slug == attribute.slug && a.id != attribute.id)
        {
            return Err(RepositoryError::DuplicateSlug(attribute.slug));
        }
        attributes.insert(attribute.id, attribute);
        Ok(())
    }

    fn delete(&self, id: AttributeId) -> Result<bool> {
        let mut attributes = self
            .attributes
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(attributes.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stats_core::AttributeKind;

    #[test]
    fn list_orders_by_display_order_then_slug() {
        let repo = InMemoryAttributeRepository::new();
        repo.save(
            Attribute::new(AttributeId(1), "vigueur", AttributeKind::BaseInteger)
                .with_display_order(2),
        )
        .unwrap();
        repo.save(
            Attribute::new(AttributeId(2), "force", AttributeKind::BaseInteger)
                .with_display_order(2),
        )
        .unwrap();
        repo.save(
            Attribute::new(AttributeId(3), "pv-max", AttributeKind::Derived).with_display_order(1),
        )
        .unwrap();

        let slugs: Vec<String> = repo.list().unwrap().into_iter().map(|a| a.slug).collect();
        assert_eq!(slugs, ["pv-max", "force", "vigueur"]);
    }

    #[test]
    fn slugs_stay_unique() {
        let repo = InMemoryAttributeRepository::new();
        repo.save(Attribute::new(AttributeId(1), "force", AttributeKind::BaseInteger))
            .unwrap();
        let err = repo
            .save(Attribute::new(AttributeId(2), "force", AttributeKind::BaseInteger))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateSlug(slug) if slug == "force"));

        // Re-saving the same id with the same slug is an update.
        repo.save(
            Attribute::new(AttributeId(1), "force", AttributeKind::BaseInteger).with_default(3.0),
        )
        .unwrap();
        assert_eq!(repo.get_by_slug("force").unwrap().unwrap().default_value, 3.0);
    }
}
