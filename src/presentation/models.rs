//! HTTP response models

use serde::Serialize;

/// Body of a 429 rejection
///
/// Field names are part of the contract with the web client, which reads
/// `retryAfter` for its countdown and `fallbackAvailable` to decide whether
/// to swap in static study content instead of an error state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitRejection {
    /// Human-readable error message
    pub error: String,

    /// Seconds until a retry can succeed
    pub retry_after: u64,

    /// Whether the client can serve static fallback content for this route
    pub fallback_available: bool,
}
