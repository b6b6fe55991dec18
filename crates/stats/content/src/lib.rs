//! Data-driven attribute content and loaders.
//!
//! Reads the attribute catalog, class baselines, item definitions and cache
//! tuning from RON/TOML files. Content files name attributes by slug; the
//! [`ContentFactory`] resolves slugs to catalog ids and rejects references
//! that do not exist.
//!
//! Content seeds repositories and never appears in the cache itself.

pub mod loaders;

pub use loaders::{
    AttributeLoader, CacheTuning, ClassContent, ClassLoader, ClassSpec, ConfigLoader, Content,
    ContentConfig, ContentFactory, ItemContent, ItemLoader, ItemSpec, LoadResult, ModifierSpec,
};
