//! Sliding Window Admission Store
//!
//! Keeps one ordered list of request timestamps per client key and admits a
//! request only when fewer than the policy's maximum fall inside the trailing
//! window. Windowing is exact: a rejected request is never recorded, so it
//! cannot extend its own penalty.
//!
//! Memory is bounded by a hard key ceiling. Crossing the occupancy threshold
//! triggers a sweep of keys whose lists prune to empty; if the store is still
//! full when a new key arrives, the key whose most recent request is oldest
//! is evicted. The scan is linear over all keys, which is acceptable for a
//! best-effort bound on the insertion-at-capacity path only.

use std::collections::HashMap;

use tracing::debug;

use super::types::{RateLimitPolicy, RateLimitResult, current_time_millis};

/// Occupancy fraction at which the proactive sweep runs (9/10)
const SWEEP_OCCUPANCY_NUM: usize = 9;
const SWEEP_OCCUPANCY_DEN: usize = 10;

/// Per-key timestamp store backing the rate limiter
///
/// Purely synchronous and infallible; the owning service serializes access.
pub struct SlidingWindowStore {
    /// Request timestamps per client key, milliseconds since epoch,
    /// non-decreasing within each list
    entries: HashMap<String, Vec<u64>>,
    /// Hard ceiling on distinct tracked keys
    max_keys: usize,
    /// Longest window seen across all policies, used as the prune horizon
    /// for whole-store sweeps
    longest_window_ms: u64,
}

impl SlidingWindowStore {
    pub fn new(max_keys: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_keys,
            longest_window_ms: 0,
        }
    }

    /// Admission check against wall-clock time
    pub fn admit(&mut self, key: &str, policy: &RateLimitPolicy) -> RateLimitResult {
        self.admit_at(key, policy, current_time_millis())
    }

    /// Admission check at an explicit instant
    ///
    /// Prunes the key's timestamps to the trailing window, rejects without
    /// recording when the surviving count has reached the policy maximum,
    /// and otherwise records `now_ms` and admits.
    pub fn admit_at(&mut self, key: &str, policy: &RateLimitPolicy, now_ms: u64) -> RateLimitResult {
        let window_ms = policy.window_millis();
        self.longest_window_ms = self.longest_window_ms.max(window_ms);
        let cutoff = now_ms.saturating_sub(window_ms);

        if let Some(stamps) = self.entries.get_mut(key) {
            stamps.retain(|&t| t >= cutoff);

            if stamps.len() as u32 >= policy.max_requests
                && let Some(&oldest) = stamps.first()
            {
                let retry_after = retry_after_secs(oldest, window_ms, now_ms);
                debug!(
                    key = %key,
                    limit = policy.max_requests,
                    retry_after = retry_after,
                    "Request rejected by sliding window"
                );
                return RateLimitResult::rejected(policy.max_requests, retry_after);
            }

            stamps.push(now_ms);
            let remaining = policy.max_requests.saturating_sub(stamps.len() as u32);
            return RateLimitResult::allowed(policy.max_requests, remaining);
        }

        self.make_room(now_ms);
        self.entries.insert(key.to_string(), vec![now_ms]);

        RateLimitResult::allowed(policy.max_requests, policy.max_requests.saturating_sub(1))
    }

    /// Free capacity before inserting a new key
    fn make_room(&mut self, now_ms: u64) {
        let threshold = self.max_keys * SWEEP_OCCUPANCY_NUM / SWEEP_OCCUPANCY_DEN;
        if self.entries.len() >= threshold {
            self.sweep_expired_at(now_ms);
        }

        if self.entries.len() >= self.max_keys {
            self.evict_stalest();
        }
    }

    /// Drop every key whose timestamps all fall outside the longest window
    ///
    /// Returns the number of keys removed.
    pub fn sweep_expired_at(&mut self, now_ms: u64) -> usize {
        let cutoff = now_ms.saturating_sub(self.longest_window_ms);
        let before = self.entries.len();

        self.entries.retain(|_, stamps| {
            stamps.retain(|&t| t >= cutoff);
            !stamps.is_empty()
        });

        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed = removed, "Sliding window occupancy sweep");
        }
        removed
    }

    /// Drop every key with no request newer than the retention horizon
    ///
    /// Used by the background reclamation task; bounds memory even across
    /// idle stretches with no traffic to trigger inline pruning.
    pub fn sweep_idle(&mut self, retention_ms: u64) -> usize {
        self.sweep_idle_at(retention_ms, current_time_millis())
    }

    /// Idle sweep at an explicit instant
    pub fn sweep_idle_at(&mut self, retention_ms: u64, now_ms: u64) -> usize {
        let cutoff = now_ms.saturating_sub(retention_ms);
        let before = self.entries.len();

        self.entries
            .retain(|_, stamps| stamps.last().is_some_and(|&newest| newest >= cutoff));

        before - self.entries.len()
    }

    /// Evict the key whose most recent request is oldest among all tracked keys
    fn evict_stalest(&mut self) {
        let stalest = self
            .entries
            .iter()
            .min_by_key(|(_, stamps)| stamps.last().copied().unwrap_or(0))
            .map(|(key, _)| key.clone());

        if let Some(key) = stalest {
            self.entries.remove(&key);
            debug!(key = %key, "Evicted least-recently-seen client key");
        }
    }

    /// Number of distinct client keys currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Seconds until the oldest surviving request leaves the window, rounded up
fn retry_after_secs(oldest_ms: u64, window_ms: u64, now_ms: u64) -> u64 {
    let wait_ms = (oldest_ms + window_ms).saturating_sub(now_ms);
    (wait_ms.div_ceil(1000)).max(1)
}
