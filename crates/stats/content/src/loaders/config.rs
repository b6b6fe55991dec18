//! Content-level cache tuning loader.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Cache tuning shipped with the content. Unset values keep the runtime's
/// own configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheTuning {
    pub default_batch_size: Option<usize>,
    pub queue_capacity: Option<usize>,
    pub event_buffer_size: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub cache: CacheTuning,
}

/// Loader for `config.toml`.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> LoadResult<ContentConfig> {
        let content = read_file(path)?;
        let config: ContentConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_and_keys_are_optional() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(&path, "").unwrap();
        assert_eq!(ConfigLoader::load(&path).unwrap(), ContentConfig::default());

        std::fs::write(&path, "[cache]\ndefault_batch_size = 25\n").unwrap();
        let config = ConfigLoader::load(&path).unwrap();
        assert_eq!(config.cache.default_batch_size, Some(25));
        assert_eq!(config.cache.queue_capacity, None);
    }

    #[test]
    fn malformed_toml_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[cache\n").unwrap();
        assert!(ConfigLoader::load(&path).is_err());
    }
}
