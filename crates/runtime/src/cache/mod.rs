//! Cache manager: the single entry point for reading and maintaining cached
//! final values.
mod locks;
mod manager;

pub use manager::{AttributeValue, CacheManager, DependentInvalidation};
