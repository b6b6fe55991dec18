//! Attribute catalog loader.

use std::path::Path;

use serde::{Deserialize, Serialize};
use stats_core::Attribute;

use crate::loaders::{LoadResult, read_file};

/// Attribute catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeCatalog {
    pub attributes: Vec<Attribute>,
}

/// Loader for the attribute catalog.
pub struct AttributeLoader;

impl AttributeLoader {
    /// Load the attribute catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<Attribute>> {
        let content = read_file(path)?;
        let catalog: AttributeCatalog = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse attribute catalog RON: {}", e))?;

        Ok(catalog.attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stats_core::{AttributeId, AttributeKind};

    #[test]
    fn optional_fields_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attributes.ron");
        std::fs::write(
            &path,
            r#"(attributes: [
                (id: (1), slug: "force", label: "Force", kind: BaseInteger,
                 default_value: 10.0, max_value: Some(100.0)),
            ])"#,
        )
        .unwrap();

        let attributes = AttributeLoader::load(&path).unwrap();
        assert_eq!(attributes.len(), 1);
        let force = &attributes[0];
        assert_eq!(force.id, AttributeId(1));
        assert_eq!(force.kind, AttributeKind::BaseInteger);
        assert_eq!(force.min_value, None);
        assert_eq!(force.max_value, Some(100.0));
        assert!(force.visible);
        assert_eq!(force.display_order, 0);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = AttributeLoader::load(Path::new("/nonexistent/attributes.ron")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/attributes.ron"));
    }
}
