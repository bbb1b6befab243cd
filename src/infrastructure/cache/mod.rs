//! Caching implementations
//!
//! A bounded in-memory TTL cache plus the read-through decorators that sit
//! between route handlers and the persistence ports.

pub mod bounded;
pub mod keys;
pub mod read_through;

pub use bounded::BoundedTtlCache;
pub use read_through::{CachedPinRepository, CachedUserRepository, EntityCaches};
