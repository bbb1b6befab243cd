//! Rate Limiter Service
//!
//! Owns the shared admission store behind a lock and runs the periodic
//! background reclamation task. Route middleware holds the service in an
//! `Arc` and calls [`RateLimiterService::admit`] with its own fixed policy.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::interval;
use tracing::debug;

use crate::config::RateLimitConfig;

use super::sliding_window::SlidingWindowStore;
use super::types::{RateLimitPolicy, RateLimitResult};

/// Main rate limiter service
pub struct RateLimiterService {
    store: Arc<RwLock<SlidingWindowStore>>,
    config: RateLimitConfig,
}

impl RateLimiterService {
    /// Create a new rate limiter service
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(SlidingWindowStore::new(config.max_tracked_keys))),
            config,
        }
    }

    /// Check if rate limiting is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Check whether a request from `key` is admitted under `policy`
    ///
    /// Rejection is a normal outcome; the call itself never fails.
    pub async fn admit(&self, key: &str, policy: &RateLimitPolicy) -> RateLimitResult {
        if !self.config.enabled {
            return RateLimitResult::allowed(u32::MAX, u32::MAX);
        }

        let mut store = self.store.write().await;
        store.admit(key, policy)
    }

    /// Number of distinct client keys currently tracked
    pub async fn tracked_keys(&self) -> usize {
        self.store.read().await.tracked_keys()
    }

    /// Start the periodic idle-key reclamation task
    ///
    /// Keys with no request newer than the retention horizon are dropped on
    /// every tick, bounding memory across idle stretches. The task only
    /// observes and logs; nothing it does can fail a request.
    pub fn start_sweeper_task(self: Arc<Self>) {
        let sweep_interval = Duration::from_secs(self.config.sweep_interval_seconds);
        let retention_ms = self.config.idle_retention_seconds * 1000;

        tokio::spawn(async move {
            let mut ticker = interval(sweep_interval);

            loop {
                ticker.tick().await;
                let (removed, tracked) = {
                    let mut store = self.store.write().await;
                    let removed = store.sweep_idle(retention_ms);
                    (removed, store.tracked_keys())
                };
                debug!(
                    removed = removed,
                    tracked = tracked,
                    "Rate limiter idle sweep completed"
                );
            }
        });
    }

    /// Get the configuration
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config() -> RateLimitConfig {
        RateLimitConfig {
            enabled: true,
            max_tracked_keys: 100,
            sweep_interval_seconds: 900,
            idle_retention_seconds: 3600,
            routes: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_disabled_service_always_admits() {
        let mut config = test_config();
        config.enabled = false;
        let service = RateLimiterService::new(config);
        let policy = RateLimitPolicy::new(1, Duration::from_secs(60));

        for _ in 0..10 {
            let result = service.admit("10.0.0.1", &policy).await;
            assert!(result.allowed);
            assert_eq!(result.limit, u32::MAX);
        }
    }

    #[tokio::test]
    async fn test_admit_then_reject() {
        let service = RateLimiterService::new(test_config());
        let policy = RateLimitPolicy::new(2, Duration::from_secs(60));

        assert!(service.admit("10.0.0.1", &policy).await.allowed);
        assert!(service.admit("10.0.0.1", &policy).await.allowed);
        assert!(!service.admit("10.0.0.1", &policy).await.allowed);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let service = RateLimiterService::new(test_config());
        let policy = RateLimitPolicy::new(1, Duration::from_secs(60));

        assert!(service.admit("10.0.0.1", &policy).await.allowed);
        assert!(!service.admit("10.0.0.1", &policy).await.allowed);
        assert!(service.admit("10.0.0.2", &policy).await.allowed);
    }
}
