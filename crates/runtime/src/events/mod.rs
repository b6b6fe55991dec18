//! Topic-based event bus for cache and batch events.
//!
//! Events are published to specific topics, and consumers subscribe only to
//! the topics they need. Delivery is best-effort observability: nothing in the
//! cache depends on an event being received.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{BatchEvent, CacheEvent, InvalidationScope};
