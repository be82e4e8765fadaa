// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Size-bounded map with least-recently-updated eviction.
//!
//! Every write stamps the key with a fresh tick; reads do not. When the map
//! grows past capacity the key with the oldest tick goes first.

use std::collections::BTreeMap;
use std::hash::Hash;

use rustc_hash::FxHashMap;

#[derive(Debug)]
pub struct BoundedMap<K, V> {
    capacity: usize,
    tick: u64,
    entries: FxHashMap<K, (u64, V)>,
    by_age: BTreeMap<u64, K>,
}

impl<K: Clone + Eq + Hash, V> BoundedMap<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            tick: 0,
            entries: FxHashMap::default(),
            by_age: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|(_, v)| v)
    }

    /// Insert or replace, then evict down to capacity.
    ///
    /// Returns the evicted entries, oldest first.
    pub fn insert(&mut self, key: K, value: V) -> Vec<(K, V)> {
        let tick = self.bump();
        if let Some((old_tick, _)) = self.entries.insert(key.clone(), (tick, value)) {
            self.by_age.remove(&old_tick);
        }
        self.by_age.insert(tick, key);
        self.evict()
    }

    /// Mutate in place (inserting `V::default()` first if absent) and mark
    /// the key as freshly updated.
    pub fn update<F>(&mut self, key: K, f: F) -> Vec<(K, V)>
    where
        V: Default,
        F: FnOnce(&mut V),
    {
        let tick = self.bump();
        let slot = self.entries.entry(key.clone()).or_insert_with(|| (tick, V::default()));
        if slot.0 != tick {
            self.by_age.remove(&slot.0);
            slot.0 = tick;
        }
        f(&mut slot.1);
        self.by_age.insert(tick, key);
        self.evict()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn bump(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn evict(&mut self) -> Vec<(K, V)> {
        let mut evicted = Vec::new();
        while self.entries.len() > self.capacity {
            let Some((_, key)) = self.by_age.pop_first() else {
                break;
            };
            if let Some((_, value)) = self.entries.remove(&key) {
                evicted.push((key, value));
            }
        }
        evicted
    }
}
