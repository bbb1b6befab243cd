//! VerseForge Core - Foundation crate for the VerseForge poetry-education platform
//!
//! This crate owns the in-process request throttling and read-through caching
//! subsystem shared by the platform's HTTP services:
//!
//! # Modules
//!
//! - [`config`] — Strongly-typed configuration with file and environment variable support
//! - [`domain`] — Core entities and the persistence ports the caching layer decorates
//! - [`infrastructure`] — Sliding-window rate limiter and bounded TTL caches
//! - [`presentation`] — HTTP admission and logging middleware
//! - [`logging`] — Structured logging with tracing
//!
//! # Architecture
//!
//! ```text
//! verseforge-core/
//! ├── domain/           # Entities and repository ports
//! ├── infrastructure/
//! │   ├── rate_limiter/ # Sliding-window admission store + service
//! │   └── cache/        # Bounded TTL cache + read-through decorators
//! ├── presentation/     # axum middleware (429 responses, request logging)
//! └── config/           # Configuration management
//! ```
//!
//! # Configuration
//!
//! Load configuration from files and environment:
//!
//! ```rust,ignore
//! use verseforge_core::Config;
//!
//! let config = Config::load()?;
//! ```
//!
//! Environment variables use the `VERSEFORGE__` prefix with double underscore
//! separators:
//!
//! ```bash
//! VERSEFORGE__SERVER__PORT=3000
//! VERSEFORGE__RATE_LIMIT__ROUTES__GENERATION__MAX_REQUESTS=5
//! ```
//!
//! # Wiring
//!
//! Route handlers attach the admission middleware per route class:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use verseforge_core::infrastructure::rate_limiter::RateLimiterService;
//! use verseforge_core::presentation::middleware::{RouteLimit, rate_limit_middleware};
//!
//! let service = Arc::new(RateLimiterService::new(config.rate_limit.clone()));
//! Arc::clone(&service).start_sweeper_task();
//!
//! let generation_limit = RouteLimit::new(Arc::clone(&service), &config.rate_limit.routes.generation);
//! let router = router.layer(axum::middleware::from_fn_with_state(
//!     generation_limit,
//!     rate_limit_middleware,
//! ));
//! ```

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod presentation;

pub use config::Config;
pub use logging::init_tracing;
