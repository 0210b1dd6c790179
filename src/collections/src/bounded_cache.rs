//! Fixed-capacity LRU cache safe for concurrent use
//!
//! The cache never loads on a miss. Callers fetch from their source of truth
//! and write back with [`BoundedCache::put`], keeping slow I/O outside the
//! internal lock.

use lru::LruCache;
use parking_lot::Mutex;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Bounded least-recently-used cache
///
/// Every operation takes `&self` and acquires a short internal mutex, so a
/// single instance can be shared across threads behind an `Arc`.
///
/// A capacity of zero is treated as one: each `put` of a new key displaces
/// the previous entry.
///
/// # Examples
///
/// ```
/// use keyward_collections::BoundedCache;
///
/// let cache = BoundedCache::new(2);
/// cache.put("a", 1);
/// cache.put("b", 2);
/// assert_eq!(cache.get(&"a"), Some(1));
///
/// // "b" is now the least recently used key
/// cache.put("c", 3);
/// assert_eq!(cache.get(&"b"), None);
/// ```
pub struct BoundedCache<K, V> {
    inner: Mutex<LruCache<K, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<K: Hash + Eq, V: Clone> BoundedCache<K, V> {
    /// Create a cache holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Get a clone of the cached value and mark it most recently used
    pub fn get(&self, key: &K) -> Option<V> {
        let value = self.inner.lock().get(key).cloned();

        match value {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };

        value
    }

    /// Insert or replace a value, marking it most recently used
    ///
    /// Returns `true` when a different key was evicted to make room.
    pub fn put(&self, key: K, value: V) -> bool {
        let evicted = {
            let mut cache = self.inner.lock();
            let existed = cache.contains(&key);
            let displaced = cache.push(key, value);
            !existed && displaced.is_some()
        };

        if evicted {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }

        evicted
    }

    /// Remove an entry, returning whether it was present
    pub fn remove(&self, key: &K) -> bool {
        self.inner.lock().pop(key).is_some()
    }

    /// Check for a key without touching its recency
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.inner.lock().cap().get()
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Snapshot of cached keys, most recently used first
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.inner.lock().iter().map(|(k, _)| k.clone()).collect()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let (entries, capacity) = {
            let cache = self.inner.lock();
            (cache.len(), cache.cap().get())
        };

        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries,
            capacity,
        }
    }
}

impl<K: Hash + Eq, V> std::fmt::Debug for BoundedCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache = self.inner.lock();
        f.debug_struct("BoundedCache")
            .field("len", &cache.len())
            .field("capacity", &cache.cap())
            .finish()
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Calculate cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
