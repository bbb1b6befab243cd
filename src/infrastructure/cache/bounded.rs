//! Bounded TTL Cache
//!
//! String-keyed map with absolute per-entry expiry and a hard entry ceiling.
//! Expired entries are purged lazily on lookup; at capacity the
//! oldest-inserted entry is evicted, first-in-first-out. With TTLs in the
//! single-digit seconds, recency-aware eviction buys nothing the clock does
//! not already provide.
//!
//! All operations are synchronous, in-memory, and infallible.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::debug;

struct CacheEntry<V> {
    value: V,
    /// Absolute expiry, milliseconds since epoch
    expires_at: u64,
}

/// Bounded key/value cache with per-entry TTL and FIFO eviction
pub struct BoundedTtlCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    /// Keys in first-insertion order; overwrites do not reorder
    insertion_order: VecDeque<String>,
    max_entries: usize,
}

impl<V: Clone> BoundedTtlCache<V> {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
            max_entries,
        }
    }

    /// Look up a live entry against wall-clock time
    pub fn get(&mut self, key: &str) -> Option<V> {
        self.get_at(key, current_time_millis())
    }

    /// Look up a live entry at an explicit instant
    ///
    /// An entry whose expiry has passed is removed and reported as absent.
    pub fn get_at(&mut self, key: &str, now_ms: u64) -> Option<V> {
        match self.entries.get(key) {
            Some(entry) if now_ms < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                self.remove(key);
                debug!(key = %key, "Cache entry expired");
                None
            }
            None => None,
        }
    }

    /// Insert or overwrite an entry, expiring `ttl` from now
    pub fn set(&mut self, key: &str, value: V, ttl: Duration) {
        self.set_at(key, value, ttl, current_time_millis());
    }

    /// Insert or overwrite an entry at an explicit instant
    ///
    /// Overwriting refreshes value and expiry but keeps the key's original
    /// insertion slot. A new key arriving at capacity evicts the
    /// oldest-inserted entry first.
    pub fn set_at(&mut self, key: &str, value: V, ttl: Duration, now_ms: u64) {
        let expires_at = now_ms + ttl.as_millis() as u64;

        if let Some(entry) = self.entries.get_mut(key) {
            entry.value = value;
            entry.expires_at = expires_at;
            return;
        }

        if self.entries.len() >= self.max_entries {
            self.evict_oldest();
        }

        self.entries.insert(key.to_string(), CacheEntry { value, expires_at });
        self.insertion_order.push_back(key.to_string());
    }

    /// Remove an entry regardless of remaining TTL
    ///
    /// Returns whether an entry was present.
    pub fn remove(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.insertion_order.retain(|k| k != key);
            return true;
        }
        false
    }

    /// Remove every entry whose key matches the predicate
    ///
    /// Returns the number of entries removed. Used by write paths to clear
    /// all state scoped to one owner in a single pass.
    pub fn invalidate_matching(&mut self, predicate: impl Fn(&str) -> bool) -> usize {
        let doomed: Vec<String> = self
            .entries
            .keys()
            .filter(|k| predicate(k))
            .cloned()
            .collect();

        for key in &doomed {
            self.entries.remove(key);
        }
        self.insertion_order.retain(|k| !predicate(k));

        doomed.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_oldest(&mut self) {
        if let Some(oldest) = self.insertion_order.pop_front() {
            self.entries.remove(&oldest);
            debug!(key = %oldest, "Evicted oldest cache entry");
        }
    }
}

fn current_time_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}
