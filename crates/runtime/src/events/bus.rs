//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{BatchEvent, CacheEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Invalidations and synchronous recomputes
    Cache,
    /// Batch recalculation lifecycle
    Batch,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Cache(CacheEvent),
    Batch(BatchEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Cache(_) => Topic::Cache,
            Event::Batch(_) => Topic::Batch,
        }
    }
}

impl From<CacheEvent> for Event {
    fn from(event: CacheEvent) -> Self {
        Event::Cache(event)
    }
}

impl From<BatchEvent> for Event {
    fn from(event: BatchEvent) -> Self {
        Event::Batch(event)
    }
}

/// Topic-based event bus
///
/// Cloning shares the underlying channels.
#[derive(Clone)]
pub struct EventBus {
    cache: broadcast::Sender<Event>,
    batch: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            cache: broadcast::channel(capacity).0,
            batch: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Cache => &self.cache,
            Topic::Batch => &self.batch,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::InvalidationScope;
    use stats_core::CharacterId;

    #[test]
    fn subscribers_only_see_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut cache_rx = bus.subscribe(Topic::Cache);
        let mut batch_rx = bus.subscribe(Topic::Batch);

        bus.publish(CacheEvent::Invalidated {
            scope: InvalidationScope::Character(CharacterId(1)),
            count: 3,
            reason: "test".into(),
        });

        assert!(matches!(
            cache_rx.try_recv(),
            Ok(Event::Cache(CacheEvent::Invalidated { count: 3, .. }))
        ));
        assert!(batch_rx.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(CacheEvent::Invalidated {
            scope: InvalidationScope::Character(CharacterId(1)),
            count: 0,
            reason: String::new(),
        });
    }
}
