//! Seeds in-memory repositories from loaded content.

use anyhow::{Result, ensure};
use stats_content::Content;
use stats_core::{Character, CharacterId};
use stats_runtime::{CharacterClass, Repositories};
use tracing::info;

/// Writes the catalog, classes, baselines and item modifiers, then creates
/// `characters` characters spread round-robin over the classes.
pub fn seed(repos: &Repositories, content: &Content, characters: u64) -> Result<Vec<CharacterId>> {
    ensure!(!content.classes.is_empty(), "Content defines no classes");

    for attribute in &content.attributes {
        repos.attributes.save(attribute.clone())?;
    }
    for class in &content.classes {
        repos
            .characters
            .save_class(CharacterClass::new(class.id, class.name.clone()))?;
        for (attribute, value) in &class.baselines {
            repos.sources.set_baseline(class.id, *attribute, *value)?;
        }
    }
    for item in &content.items {
        repos
            .equipment
            .set_definition_modifiers(item.id, item.modifiers.clone())?;
    }

    let mut ids = Vec::new();
    for (n, class) in (1..=characters).zip(content.classes.iter().cycle()) {
        let id = CharacterId(n);
        repos
            .characters
            .save(Character::new(id, class.id, format!("{} {}", class.name, n)))?;
        ids.push(id);
    }

    info!(
        "Seeded {} attributes, {} classes, {} items, {} characters",
        content.attributes.len(),
        content.classes.len(),
        content.items.len(),
        ids.len()
    );
    Ok(ids)
}
