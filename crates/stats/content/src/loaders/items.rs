//! Item definition loader.

use std::path::Path;

use serde::{Deserialize, Serialize};
use stats_core::{ItemDefinitionId, ModifierKind};

use crate::loaders::{LoadResult, read_file};

/// Modifier granted by an item, targeting an attribute slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierSpec {
    pub attribute: String,
    pub kind: ModifierKind,
    pub value: f64,
}

/// Item definition with the modifiers it grants while equipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSpec {
    pub id: ItemDefinitionId,
    pub name: String,
    #[serde(default)]
    pub modifiers: Vec<ModifierSpec>,
}

/// Item catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCatalog {
    pub items: Vec<ItemSpec>,
}

/// Loader for item catalog from RON files.
pub struct ItemLoader;

impl ItemLoader {
    /// Load item catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<ItemSpec>> {
        let content = read_file(path)?;
        let catalog: ItemCatalog = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse item catalog RON: {}", e))?;

        Ok(catalog.items)
    }
}
