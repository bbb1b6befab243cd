//! Configuration validation module

use crate::config::{CacheConfig, RateLimitConfig, RoutePolicyConfig, ServerConfig};

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Server configuration error: {message}")]
    Server { message: String },

    #[error("Rate limit configuration error: {message}")]
    RateLimit { message: String },

    #[error("Cache configuration error: {message}")]
    Cache { message: String },
}

impl ValidationError {
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        // u16 cannot exceed 65535, so only 0 needs rejecting
        if self.port == 0 {
            return Err(ValidationError::server(format!(
                "Port must be in range 1-65535, got {}",
                self.port
            )));
        }

        if self.host.is_empty() {
            return Err(ValidationError::server("Host cannot be empty".to_string()));
        }

        if self.request_timeout_seconds == 0 {
            return Err(ValidationError::server(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_route(name: &str, route: &RoutePolicyConfig) -> Result<(), ValidationError> {
    if route.max_requests == 0 {
        return Err(ValidationError::rate_limit(format!(
            "Route '{}' max_requests must be greater than 0",
            name
        )));
    }
    if route.window_seconds == 0 {
        return Err(ValidationError::rate_limit(format!(
            "Route '{}' window_seconds must be greater than 0",
            name
        )));
    }
    Ok(())
}

impl Validate for RateLimitConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_tracked_keys == 0 {
            return Err(ValidationError::rate_limit(
                "max_tracked_keys must be greater than 0".to_string(),
            ));
        }

        if self.sweep_interval_seconds == 0 {
            return Err(ValidationError::rate_limit(
                "sweep_interval_seconds must be greater than 0".to_string(),
            ));
        }

        if self.idle_retention_seconds == 0 {
            return Err(ValidationError::rate_limit(
                "idle_retention_seconds must be greater than 0".to_string(),
            ));
        }

        validate_route("generation", &self.routes.generation)?;
        validate_route("checkout", &self.routes.checkout)?;
        validate_route("journal", &self.routes.journal)?;
        validate_route("default", &self.routes.default)?;

        Ok(())
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_entries == 0 {
            return Err(ValidationError::cache(
                "max_entries must be greater than 0".to_string(),
            ));
        }

        if self.user_ttl_seconds == 0 || self.pinned_ttl_seconds == 0 {
            return Err(ValidationError::cache(
                "Cache TTLs must be greater than 0 seconds".to_string(),
            ));
        }

        Ok(())
    }
}
