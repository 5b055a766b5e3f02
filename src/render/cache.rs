//! Bounded least-recently-used cache.
//!
//! Each engine owns its caches; nothing here is process-wide. A lookup
//! refreshes the entry, and inserting past capacity evicts the entry that
//! was touched longest ago.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// LRU cache with an explicit capacity. A capacity of 0 disables caching.
#[derive(Debug, Clone)]
pub struct LruCache<K: Hash + Eq + Clone, V> {
    entries: HashMap<K, (V, u64)>,
    recency: BTreeMap<u64, K>,
    clock: u64,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            clock: 0,
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity, evicting down to it immediately.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.enforce_cap();
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Look up a value and mark it as recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let stamp = self.tick();
        match self.entries.get_mut(key) {
            Some((_, old)) => {
                self.hits += 1;
                let previous = std::mem::replace(old, stamp);
                if let Some(k) = self.recency.remove(&previous) {
                    self.recency.insert(stamp, k);
                }
            }
            None => {
                self.misses += 1;
                return None;
            }
        }
        self.entries.get(key).map(|(v, _)| v)
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        let stamp = self.tick();
        if let Some((_, previous)) = self.entries.insert(key.clone(), (value, stamp)) {
            self.recency.remove(&previous);
        }
        self.recency.insert(stamp, key);
        self.enforce_cap();
    }

    /// Cached value for `key`, computing and storing it on a miss.
    pub fn get_or_insert_with<F>(&mut self, key: &K, compute: F) -> V
    where
        V: Clone,
        F: FnOnce() -> V,
    {
        if let Some(v) = self.get(key) {
            return v.clone();
        }
        let value = compute();
        self.insert(key.clone(), value.clone());
        value
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation or the last [`clear`](Self::clear).
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
        self.hits = 0;
        self.misses = 0;
    }

    fn enforce_cap(&mut self) {
        while self.entries.len() > self.capacity {
            let Some((_, oldest)) = self.recency.pop_first() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache: LruCache<&str, i32> = LruCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.get(&"a"), Some(&1));
        cache.insert("c", 3);
        assert!(cache.contains_key(&"a"));
        assert!(!cache.contains_key(&"b"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_replace_keeps_single_entry() {
        let mut cache: LruCache<&str, i32> = LruCache::new(2);
        cache.insert("a", 1);
        cache.insert("a", 5);
        cache.insert("b", 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a"), Some(&5));
    }

    #[test]
    fn test_zero_capacity_never_stores() {
        let mut cache: LruCache<&str, i32> = LruCache::new(0);
        cache.insert("a", 1);
        assert!(cache.is_empty());
        let mut calls = 0;
        let v = cache.get_or_insert_with(&"a", || {
            calls += 1;
            7
        });
        assert_eq!((v, calls), (7, 1));
    }

    #[test]
    fn test_get_or_insert_counts_hits() {
        let mut cache: LruCache<u32, u32> = LruCache::new(8);
        cache.get_or_insert_with(&1, || 10);
        cache.get_or_insert_with(&1, || 99);
        assert_eq!(cache.get(&1), Some(&10));
        assert_eq!(cache.stats(), (2, 1));
        cache.clear();
        assert_eq!(cache.stats(), (0, 0));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_shrinking_capacity_evicts() {
        let mut cache: LruCache<u32, u32> = LruCache::new(4);
        for i in 0..4 {
            cache.insert(i, i);
        }
        cache.set_capacity(1);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains_key(&3));
    }
}
