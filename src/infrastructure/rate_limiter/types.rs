//! Rate limiter types and core data structures

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Admission policy for one route class
///
/// The pair is fixed when the route is wired up; it is never renegotiated
/// per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Maximum requests admitted inside any trailing window
    pub max_requests: u32,
    /// Window length
    pub window: Duration,
}

impl RateLimitPolicy {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    /// Window length in milliseconds, the store's native unit
    pub fn window_millis(&self) -> u64 {
        self.window.as_millis() as u64
    }
}

/// Result of an admission check
///
/// A rejected request is a normal outcome, not an error; the HTTP layer maps
/// it to a 429 with retry guidance.
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    /// Whether the request is admitted
    pub allowed: bool,
    /// Maximum requests allowed in the window
    pub limit: u32,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// Retry-After hint in seconds (only set when rejected)
    pub retry_after: Option<u64>,
}

impl RateLimitResult {
    /// Create an allowed result
    pub fn allowed(limit: u32, remaining: u32) -> Self {
        Self {
            allowed: true,
            limit,
            remaining,
            retry_after: None,
        }
    }

    /// Create a rejected result
    pub fn rejected(limit: u32, retry_after: u64) -> Self {
        Self {
            allowed: false,
            limit,
            remaining: 0,
            retry_after: Some(retry_after),
        }
    }
}

/// Get current time in milliseconds since Unix epoch
pub fn current_time_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}
