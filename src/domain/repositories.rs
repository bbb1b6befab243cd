//! Persistence ports
//!
//! The Postgres implementations live in the platform's persistence component;
//! this crate consumes the ports and decorates them with read-through caching.

use async_trait::async_trait;

use super::entities::{PinnedItem, User, UserId};
use super::errors::StoreError;

/// Port for user record persistence
#[async_trait]
pub trait IUserRepository: Send + Sync {
    /// Fetch a user by id. `Ok(None)` means the user does not exist.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Insert or update a user record.
    async fn upsert(&self, user: &User) -> Result<(), StoreError>;

    /// Delete a user record.
    async fn delete(&self, id: &UserId) -> Result<(), StoreError>;
}

/// Port for pinned-poem persistence
#[async_trait]
pub trait IPinRepository: Send + Sync {
    /// All poems pinned by a user, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<PinnedItem>, StoreError>;

    /// Pin a poem to the user's shelf.
    async fn pin(&self, item: &PinnedItem) -> Result<(), StoreError>;

    /// Remove a pinned poem from the user's shelf.
    async fn unpin(&self, user_id: &UserId, poem_slug: &str) -> Result<(), StoreError>;
}
