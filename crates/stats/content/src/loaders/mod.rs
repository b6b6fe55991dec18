//! Content loaders for reading attribute data from files.

pub mod attributes;
pub mod classes;
pub mod config;
pub mod factory;
pub mod items;

pub use attributes::AttributeLoader;
pub use classes::{ClassLoader, ClassSpec};
pub use config::{CacheTuning, ConfigLoader, ContentConfig};
pub use factory::{ClassContent, Content, ContentFactory, ItemContent};
pub use items::{ItemLoader, ItemSpec, ModifierSpec};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
