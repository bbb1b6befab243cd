//! Rate Limiting Infrastructure
//!
//! This module provides the per-instance request admission system:
//! - Sliding window counter over exact request timestamps (no bursts)
//! - Hard ceiling on tracked client keys with proactive sweeps and
//!   least-recently-used eviction under pressure
//! - Background reclamation of idle keys, independent of request traffic
//!
//! State is process-local by design; each instance of a multi-instance
//! deployment throttles independently.

pub mod service;
pub mod sliding_window;
pub mod types;

pub use service::RateLimiterService;
pub use sliding_window::SlidingWindowStore;
pub use types::{RateLimitPolicy, RateLimitResult};
