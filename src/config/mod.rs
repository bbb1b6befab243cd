//! Configuration management

pub mod validation;

pub use validation::{Validate, ValidationError};

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::infrastructure::rate_limiter::types::RateLimitPolicy;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub rate_limit: RateLimitConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Global request timeout in seconds applied at the HTTP layer.
    pub request_timeout_seconds: u64,
    /// Allowed CORS origins. Use ["*"] to allow any (development only).
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout_seconds: 30,
            allowed_origins: vec!["*".to_string()],
        }
    }
}

/// Admission policy for one route class
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutePolicyConfig {
    /// Maximum requests admitted per window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_seconds: u64,
    /// Whether the web client can fall back to static content when throttled
    pub fallback_available: bool,
}

impl RoutePolicyConfig {
    /// The runtime policy handed to the admission store
    pub fn policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(self.max_requests, Duration::from_secs(self.window_seconds))
    }
}

impl Default for RoutePolicyConfig {
    fn default() -> Self {
        Self {
            max_requests: 120,
            window_seconds: 60,
            fallback_available: false,
        }
    }
}

/// Per-route admission policies
///
/// Generation endpoints proxy the LLM and are the most expensive, so they get
/// the tightest budget and the static-content fallback flag for the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteLimitsConfig {
    /// AI poem generation and feedback endpoints
    pub generation: RoutePolicyConfig,
    /// Stripe checkout session creation
    pub checkout: RoutePolicyConfig,
    /// Journal entry reads and writes
    pub journal: RoutePolicyConfig,
    /// Everything else
    pub default: RoutePolicyConfig,
}

impl Default for RouteLimitsConfig {
    fn default() -> Self {
        Self {
            generation: RoutePolicyConfig {
                max_requests: 5,
                window_seconds: 60,
                fallback_available: true,
            },
            checkout: RoutePolicyConfig {
                max_requests: 10,
                window_seconds: 60,
                fallback_available: false,
            },
            journal: RoutePolicyConfig {
                max_requests: 60,
                window_seconds: 60,
                fallback_available: false,
            },
            default: RoutePolicyConfig::default(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enabled
    pub enabled: bool,
    /// Hard ceiling on the number of distinct client keys tracked
    pub max_tracked_keys: usize,
    /// Background idle-key sweep interval in seconds
    pub sweep_interval_seconds: u64,
    /// Keys with no request newer than this horizon are dropped by the sweep (seconds)
    pub idle_retention_seconds: u64,
    /// Per-route admission policies
    pub routes: RouteLimitsConfig,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_tracked_keys: 10_000,
            sweep_interval_seconds: 900, // 15 minutes
            idle_retention_seconds: 3600, // 1 hour
            routes: RouteLimitsConfig::default(),
        }
    }
}

/// Entity cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Hard ceiling on entries per cache instance
    pub max_entries: usize,
    /// TTL for single-entity lookups in seconds
    pub user_ttl_seconds: u64,
    /// TTL for per-user collections in seconds. Collections churn faster,
    /// so staleness is more visible and the window is shorter.
    pub pinned_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            user_ttl_seconds: 10,
            pinned_ttl_seconds: 5,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Output format: "json" or "pretty"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.rate_limit.validate()?;
        self.cache.validate()?;
        Ok(())
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        // Add environment-specific config if ENV is set
        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        // Add local config and environment variables last (highest priority)
        builder = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("VERSEFORGE").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;

        // Validate the loaded configuration
        config.validate()?;

        Ok(config)
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),
}
