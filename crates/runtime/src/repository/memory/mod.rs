//! In-memory repository implementations for testing and development.

mod attribute;
mod cache;
mod character;
mod effect;
mod equipment;
mod source;

pub use attribute::InMemoryAttributeRepository;
pub use cache::InMemoryCacheStore;
pub use character::InMemoryCharacterRepository;
pub use effect::InMemoryEffectRepository;
pub use equipment::InMemoryEquipmentRepository;
pub use source::InMemorySourceRepository;
