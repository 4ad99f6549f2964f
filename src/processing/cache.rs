//! Bounded cache for transform results

use crate::core::{LocalPosition, CACHE_KEY_PRECISION, DEFAULT_CACHE_CAPACITY};
use std::collections::{HashMap, VecDeque};

/// Cache of geographic-to-local transform results keyed by quantized input.
///
/// Keys round lat/lng to a fixed precision so nearby queries hit the same
/// entry. Entries are evicted oldest-inserted-first: one at a time when the
/// bound is reached, or a fraction at once during periodic maintenance.
pub struct TransformCache {
    entries: HashMap<String, LocalPosition>,
    /// Keys in insertion order, oldest at the front
    insertion_order: VecDeque<String>,
    capacity: usize,
    hit_count: usize,
    miss_count: usize,
}

impl Default for TransformCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl TransformCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
            capacity: capacity.max(1),
            hit_count: 0,
            miss_count: 0,
        }
    }

    /// Build the quantized key for a geographic coordinate
    pub fn key_for(lat: f64, lng: f64) -> String {
        format!(
            "{:.prec$}|{:.prec$}",
            lat,
            lng,
            prec = CACHE_KEY_PRECISION
        )
    }

    pub fn get(&mut self, key: &str) -> Option<LocalPosition> {
        if let Some(&pos) = self.entries.get(key) {
            self.hit_count += 1;
            Some(pos)
        } else {
            self.miss_count += 1;
            None
        }
    }

    /// Store a result, evicting the single oldest entry if the bound is hit
    pub fn insert(&mut self, key: String, value: LocalPosition) {
        if self.entries.contains_key(&key) {
            self.entries.insert(key, value);
            return;
        }

        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.insertion_order.pop_front() {
                self.entries.remove(&oldest);
            }
        }

        self.insertion_order.push_back(key.clone());
        self.entries.insert(key, value);
    }

    /// Bulk-evict the oldest fraction of entries; used by periodic maintenance
    pub fn prune_fraction(&mut self, fraction: f64) {
        let count = (self.entries.len() as f64 * fraction.clamp(0.0, 1.0)) as usize;
        for _ in 0..count {
            if let Some(oldest) = self.insertion_order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hit count, miss count, and hit rate
    pub fn statistics(&self) -> (usize, usize, f64) {
        let total = self.hit_count + self.miss_count;
        let hit_rate = if total > 0 {
            self.hit_count as f64 / total as f64
        } else {
            0.0
        };
        (self.hit_count, self.miss_count, hit_rate)
    }
}
