//! Cached final values and cache-wide statistics.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stats_core::{AttributeId, CharacterId};

/// Composite key of a cache entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub character: CharacterId,
    pub attribute: AttributeId,
}

impl CacheKey {
    pub const fn new(character: CharacterId, attribute: AttributeId) -> Self {
        Self {
            character,
            attribute,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.character, self.attribute)
    }
}

/// One cached final value.
///
/// A fresh entry (`stale == false`) is authoritative. A stale entry keeps
/// its last-known value until it is recomputed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub final_value: f64,
    pub stale: bool,
    pub computed_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn fresh(key: CacheKey, final_value: f64, computed_at: DateTime<Utc>) -> Self {
        Self {
            key,
            final_value,
            stale: false,
            computed_at,
        }
    }

    pub fn is_fresh(&self) -> bool {
        !self.stale
    }
}

/// Observability snapshot of the cache.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStatistics {
    pub total_entries: usize,
    pub stale_entries: usize,
    /// Fresh entries over total; 1.0 for an empty cache.
    pub freshness_ratio: f64,
    pub oldest_computed_at: Option<DateTime<Utc>>,
    pub newest_computed_at: Option<DateTime<Utc>>,
}

impl CacheStatistics {
    /// Folds a set of entries into statistics.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a CacheEntry>) -> Self {
        let mut stats = Self::default();
        for entry in entries {
            stats.total_entries += 1;
            if entry.stale {
                stats.stale_entries += 1;
            }
            stats.oldest_computed_at = Some(match stats.oldest_computed_at {
                Some(oldest) => oldest.min(entry.computed_at),
                None => entry.computed_at,
            });
            stats.newest_computed_at = Some(match stats.newest_computed_at {
                Some(newest) => newest.max(entry.computed_at),
                None => entry.computed_at,
            });
        }
        stats.freshness_ratio = if stats.total_entries == 0 {
            1.0
        } else {
            stats.fresh_entries() as f64 / stats.total_entries as f64
        };
        stats
    }

    pub fn fresh_entries(&self) -> usize {
        self.total_entries - self.stale_entries
    }
}
