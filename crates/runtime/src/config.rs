//! Runtime configuration.
use std::env;

/// Runtime configuration shared across the cache manager and workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Characters per committed chunk when a batch job does not specify one.
    pub default_batch_size: usize,
    /// Pending batch jobs before `enqueue` reports `QueueFull`.
    pub queue_capacity: usize,
    /// Per-topic event bus capacity.
    pub event_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_batch_size: 100,
            queue_capacity: 64,
            event_buffer_size: 256,
        }
    }
}

impl RuntimeConfig {
    /// Construct runtime configuration from environment variables.
    ///
    /// Environment variables:
    /// - `STATS_BATCH_SIZE` - Default batch chunk size (default: 100)
    /// - `STATS_QUEUE_CAPACITY` - Recalculation queue capacity (default: 64)
    /// - `STATS_EVENT_BUFFER` - Event bus capacity per topic (default: 256)
    pub fn from_env() -> Self {
        Self::default().overlay_env()
    }

    /// Replaces fields whose environment variable is set, keeping the rest.
    pub fn overlay_env(mut self) -> Self {
        if let Some(size) = read_env::<usize>("STATS_BATCH_SIZE") {
            self.default_batch_size = size.max(1);
        }
        if let Some(capacity) = read_env::<usize>("STATS_QUEUE_CAPACITY") {
            self.queue_capacity = capacity.max(1);
        }
        if let Some(buffer) = read_env::<usize>("STATS_EVENT_BUFFER") {
            self.event_buffer_size = buffer.max(1);
        }
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.default_batch_size = size.max(1);
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn with_event_buffer(mut self, size: usize) -> Self {
        self.event_buffer_size = size.max(1);
        self
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_keep_sizes_positive() {
        let config = RuntimeConfig::default()
            .with_batch_size(0)
            .with_queue_capacity(0);
        assert_eq!(config.default_batch_size, 1);
        assert_eq!(config.queue_capacity, 1);
    }
}
