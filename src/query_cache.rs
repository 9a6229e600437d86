/*
ENSnano, a 3d graphical application for DNA nanostructures.
    Copyright (C) 2021  Nicolas Levy <nicolaspierrelevy@gmail.com> and Nicolas Schabanel <nicolas.schabanel@ens-lyon.fr>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/
//! Bounded memoization of spatial queries.
//!
//! A `QueryCache` remembers the results of the last `capacity` distinct queries. When it is
//! full, the oldest inserted query is forgotten first, regardless of how often it was read.
//!
//! Entries are tagged with the generation of the data they were computed from. The owner of
//! the cache bumps its generation counter whenever the data changes, and a lookup made with a
//! newer generation empties the cache before anything is read from it.

use ahash::RandomState;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Number of lookups answered from memory and number of lookups that had to be computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Clone, Debug)]
pub(crate) struct QueryCache<K: Eq + Hash + Clone, V: Clone> {
    capacity: usize,
    generation: u64,
    keys: VecDeque<K>,
    results: HashMap<K, V, RandomState>,
    stats: CacheStats,
}

impl<K: Eq + Hash + Clone, V: Clone> QueryCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut results: HashMap<K, V, RandomState> = Default::default();
        results.reserve(capacity);
        Self {
            capacity,
            generation: 0,
            keys: VecDeque::with_capacity(capacity),
            results,
            stats: Default::default(),
        }
    }

    /// Return the result of `key`, calling `compute` only if it is not remembered for
    /// `generation`.
    pub fn get_or_insert_with<F>(&mut self, generation: u64, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if generation != self.generation {
            self.clear();
            self.generation = generation;
        }
        if let Some(result) = self.results.get(&key) {
            self.stats.hits += 1;
            return result.clone();
        }
        self.stats.misses += 1;
        let result = compute();
        if self.keys.len() == self.capacity {
            if let Some(oldest) = self.keys.pop_front() {
                self.results.remove(&oldest);
            }
        }
        self.keys.push_back(key.clone());
        self.results.insert(key, result.clone());
        result
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.results.clear();
    }

    #[allow(dead_code)] //used in tests
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
