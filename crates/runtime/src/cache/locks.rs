//! Per-key advisory locks for synchronous recomputation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::repository::CacheKey;

/// At most one recomputation per cache key at a time.
///
/// Slots are created on demand and dropped once no caller holds or waits on
/// them. Holding a key never blocks other keys.
#[derive(Default)]
pub(crate) struct KeyLocks {
    slots: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock for `key`.
    pub(crate) fn with_key<T>(&self, key: CacheKey, f: impl FnOnce() -> T) -> T {
        let slot = {
            let mut slots = self.table();
            Arc::clone(slots.entry(key).or_default())
        };

        let result = {
            // The guarded data is `()`, so a poisoned slot is still usable.
            let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        let mut slots = self.table();
        // One reference in the table plus ours: nobody else is waiting.
        if Arc::strong_count(&slot) == 2 {
            slots.remove(&key);
        }
        result
    }

    fn table(&self) -> MutexGuard<'_, HashMap<CacheKey, Arc<Mutex<()>>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.table().len()
    }
}
