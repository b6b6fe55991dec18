//! Event types for different topics.

use serde::{Deserialize, Serialize};
use stats_core::{AttributeId, CharacterId};

use crate::repository::CacheKey;
use crate::workers::{BatchReport, JobId};

/// What an invalidation covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvalidationScope {
    Entry(CacheKey),
    Character(CharacterId),
    Attribute(AttributeId),
}

/// Events related to cache entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CacheEvent {
    /// Entries were marked stale
    Invalidated {
        scope: InvalidationScope,
        count: usize,
        /// Free-form reason supplied by the caller
        reason: String,
    },

    /// A value was recomputed synchronously and written back
    Recomputed { key: CacheKey, value: f64 },

    /// Entries were garbage-collected
    Removed { scope: InvalidationScope, count: usize },
}

/// Events related to batch recalculation jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BatchEvent {
    Queued {
        job: JobId,
        attribute: AttributeId,
        reason: String,
    },

    Started {
        job: JobId,
        attribute: AttributeId,
        total: usize,
    },

    /// One chunk was evaluated and committed
    ChunkCommitted {
        job: JobId,
        processed: usize,
        total: usize,
    },

    Completed(BatchReport),

    /// The job could not run at all (e.g. the affected set could not be read)
    Failed { job: JobId, error: String },
}
