//! Class baseline loader.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use stats_core::ClassId;

use crate::loaders::{LoadResult, read_file};

/// One class and its base attribute baselines, keyed by attribute slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSpec {
    pub id: ClassId,
    pub name: String,
    #[serde(default)]
    pub baselines: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassCatalog {
    pub classes: Vec<ClassSpec>,
}

/// Loader for class definitions from RON files.
pub struct ClassLoader;

impl ClassLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<ClassSpec>> {
        let content = read_file(path)?;
        let catalog: ClassCatalog = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse class catalog RON: {}", e))?;

        Ok(catalog.classes)
    }
}
