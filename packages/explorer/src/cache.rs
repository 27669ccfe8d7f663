//! Memoized reference data.
//!
//! Reference tables are loaded at most once per key and shared as `Arc`s.
//! Entries live until they are invalidated by hand.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A load-once store keyed by source identity and load parameters.
#[derive(Debug)]
pub struct MemoCache<K, V> {
    entries: Mutex<BTreeMap<K, Arc<V>>>,
}

impl<K: Ord, V> Default for MemoCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<K: Ord + Clone, V> MemoCache<K, V> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<K, Arc<V>>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The cached value for `key`, if loaded.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.lock().get(key).cloned()
    }

    /// Returns the cached value for `key`, running `load` on a miss.
    ///
    /// The lock is not held while loading, so slow loads of different keys
    /// do not serialize. If two callers race on the same key, the first
    /// value stored wins and both receive it.
    ///
    /// # Errors
    ///
    /// Returns whatever `load` returns. Failed loads are not cached.
    pub fn get_or_try_load<E>(
        &self,
        key: &K,
        load: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }

        let loaded = Arc::new(load()?);
        Ok(Arc::clone(
            self.lock().entry(key.clone()).or_insert(loaded),
        ))
    }

    /// Drops one entry. Returns whether it was present.
    pub fn invalidate(&self, key: &K) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
