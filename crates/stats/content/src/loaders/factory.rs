//! Content factory for loading and resolving a data directory.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{bail, ensure};
use stats_core::{Attribute, AttributeId, ClassId, ItemDefinitionId, Modifier};

use crate::loaders::{
    AttributeLoader, ClassLoader, ClassSpec, ConfigLoader, ContentConfig, ItemLoader, ItemSpec,
    LoadResult,
};

/// A class with baselines resolved to attribute ids.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassContent {
    pub id: ClassId,
    pub name: String,
    pub baselines: Vec<(AttributeId, f64)>,
}

/// An item definition with modifiers resolved to attribute ids.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemContent {
    pub id: ItemDefinitionId,
    pub name: String,
    pub modifiers: Vec<Modifier>,
}

/// Every content file of a data directory, cross-checked.
#[derive(Debug, Clone)]
pub struct Content {
    pub attributes: Vec<Attribute>,
    pub classes: Vec<ClassContent>,
    pub items: Vec<ItemContent>,
    pub config: ContentConfig,
}

impl Content {
    pub fn attribute(&self, slug: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.slug == slug)
    }
}

/// Content factory that loads attribute content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── attributes.ron
/// ├── classes.ron
/// └── items.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load cache tuning from `config.toml`. A missing file yields defaults.
    pub fn load_config(&self) -> LoadResult<ContentConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(ContentConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the attribute catalog from `attributes.ron`.
    pub fn load_attributes(&self) -> LoadResult<Vec<Attribute>> {
        let path = self.data_dir.join("attributes.ron");
        AttributeLoader::load(&path)
    }

    /// Load class definitions from `classes.ron`.
    pub fn load_classes(&self) -> LoadResult<Vec<ClassSpec>> {
        let path = self.data_dir.join("classes.ron");
        ClassLoader::load(&path)
    }

    /// Load item definitions from `items.ron`.
    pub fn load_items(&self) -> LoadResult<Vec<ItemSpec>> {
        let path = self.data_dir.join("items.ron");
        ItemLoader::load(&path)
    }

    /// Loads every file and resolves slugs against the catalog.
    ///
    /// Fails on duplicate ids or slugs, baselines for non-base attributes,
    /// and references to unknown slugs.
    pub fn load_content(&self) -> LoadResult<Content> {
        let attributes = self.load_attributes()?;
        check_catalog(&attributes)?;
        let by_slug: HashMap<&str, &Attribute> =
            attributes.iter().map(|a| (a.slug.as_str(), a)).collect();

        let classes = self
            .load_classes()?
            .into_iter()
            .map(|spec| resolve_class(spec, &by_slug))
            .collect::<LoadResult<Vec<_>>>()?;
        let items = self
            .load_items()?
            .into_iter()
            .map(|spec| resolve_item(spec, &by_slug))
            .collect::<LoadResult<Vec<_>>>()?;
        let config = self.load_config()?;

        Ok(Content {
            attributes,
            classes,
            items,
            config,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

fn check_catalog(attributes: &[Attribute]) -> LoadResult<()> {
    let mut ids = HashSet::new();
    let mut slugs = HashSet::new();
    for attribute in attributes {
        ensure!(
            ids.insert(attribute.id),
            "Duplicate attribute id {}",
            attribute.id
        );
        ensure!(
            slugs.insert(attribute.slug.as_str()),
            "Duplicate attribute slug '{}'",
            attribute.slug
        );
    }
    Ok(())
}

fn resolve_class(spec: ClassSpec, by_slug: &HashMap<&str, &Attribute>) -> LoadResult<ClassContent> {
    let mut baselines = Vec::with_capacity(spec.baselines.len());
    for (slug, value) in &spec.baselines {
        let Some(attribute) = by_slug.get(slug.as_str()) else {
            bail!("Class '{}' sets a baseline for unknown attribute '{}'", spec.name, slug);
        };
        ensure!(
            attribute.kind.is_base(),
            "Class '{}' sets a baseline for {} attribute '{}'",
            spec.name,
            attribute.kind,
            slug
        );
        baselines.push((attribute.id, *value));
    }
    Ok(ClassContent {
        id: spec.id,
        name: spec.name,
        baselines,
    })
}

fn resolve_item(spec: ItemSpec, by_slug: &HashMap<&str, &Attribute>) -> LoadResult<ItemContent> {
    let mut modifiers = Vec::with_capacity(spec.modifiers.len());
    for modifier in &spec.modifiers {
        let Some(attribute) = by_slug.get(modifier.attribute.as_str()) else {
            bail!(
                "Item '{}' modifies unknown attribute '{}'",
                spec.name,
                modifier.attribute
            );
        };
        modifiers.push(Modifier {
            attribute: attribute.id,
            kind: modifier.kind,
            value: modifier.value,
        });
    }
    Ok(ItemContent {
        id: spec.id,
        name: spec.name,
        modifiers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stats_core::ModifierKind;

    const ATTRIBUTES: &str = r#"(attributes: [
        (id: (1), slug: "force", label: "Force", kind: BaseInteger, default_value: 0.0),
        (id: (2), slug: "vigueur", label: "Vigueur", kind: BaseInteger, default_value: 0.0),
        (id: (10), slug: "pv-max", label: "PV max", kind: Derived, default_value: 0.0),
    ])"#;

    fn data_dir(classes: &str, items: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("attributes.ron"), ATTRIBUTES).unwrap();
        std::fs::write(dir.path().join("classes.ron"), classes).unwrap();
        std::fs::write(dir.path().join("items.ron"), items).unwrap();
        dir
    }

    #[test]
    fn config_toml_is_optional() {
        let dir = data_dir("(classes: [])", "(items: [])");
        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_config().unwrap(), ContentConfig::default());

        std::fs::write(
            dir.path().join("config.toml"),
            "[cache]\ndefault_batch_size = 7\n",
        )
        .unwrap();
        let content = factory.load_content().unwrap();
        assert_eq!(content.config.cache.default_batch_size, Some(7));
        assert_eq!(content.config.cache.queue_capacity, None);
    }

    #[test]
    fn missing_content_file_is_named() {
        let dir = data_dir("(classes: [])", "(items: [])");
        std::fs::remove_file(dir.path().join("classes.ron")).unwrap();

        let err = ContentFactory::new(dir.path()).load_content().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("classes.ron"), "{message}");
        assert!(message.starts_with("Failed to read file"));
    }

    #[test]
    fn slugs_resolve_to_catalog_ids() {
        let dir = data_dir(
            r#"(classes: [
                (id: (1), name: "Guerrier", baselines: {"force": 15.0, "vigueur": 10.0}),
            ])"#,
            r#"(items: [(id: (7), name: "Ceinture", modifiers: [
                (attribute: "vigueur", kind: Flat, value: 4.0),
                (attribute: "pv-max", kind: Percent, value: 10.0),
            ])])"#,
        );

        let content = ContentFactory::new(dir.path()).load_content().unwrap();
        assert_eq!(
            content.classes[0].baselines,
            vec![(AttributeId(1), 15.0), (AttributeId(2), 10.0)]
        );
        let belt = &content.items[0];
        assert_eq!(belt.id, ItemDefinitionId(7));
        assert_eq!(belt.modifiers[1].attribute, AttributeId(10));
        assert_eq!(belt.modifiers[1].kind, ModifierKind::Percent);
        assert_eq!(content.config, ContentConfig::default());
        assert_eq!(content.attribute("pv-max").map(|a| a.id), Some(AttributeId(10)));
    }

    #[test]
    fn baselines_on_derived_attributes_are_rejected() {
        let dir = data_dir(
            r#"(classes: [(id: (1), name: "Guerrier", baselines: {"pv-max": 50.0})])"#,
            "(items: [])",
        );
        let err = ContentFactory::new(dir.path()).load_content().unwrap_err();
        assert!(err.to_string().contains("derived attribute 'pv-max'"));
    }

    #[test]
    fn unknown_modifier_target_is_rejected() {
        let dir = data_dir(
            "(classes: [])",
            r#"(items: [(id: (1), name: "Anneau", modifiers: [
                (attribute: "chance", kind: Flat, value: 1.0),
            ])])"#,
        );
        let err = ContentFactory::new(dir.path()).load_content().unwrap_err();
        assert!(err.to_string().contains("unknown attribute 'chance'"));
    }

    #[test]
    fn bundled_data_directory_loads() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../data");
        let content = ContentFactory::new(dir).load_content().unwrap();
        assert!(content.attribute("force").is_some());
        assert!(!content.classes.is_empty());
        assert!(!content.items.is_empty());
        assert!(content.config.cache.default_batch_size.is_some());
    }
}
