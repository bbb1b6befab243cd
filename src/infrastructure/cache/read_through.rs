//! Read-through entity caching
//!
//! Decorators over the persistence ports. A hit returns immediately; a miss
//! reads through to the underlying store and populates the cache with the
//! result before returning it — including a confirmed-absent sentinel, so a
//! nonexistent user does not cost a store round trip on every lookup. Write
//! paths delegate first and invalidate synchronously before returning, so a
//! subsequent read never observes the overwritten value.
//!
//! The cache only wraps successful reads: an underlying store error
//! propagates unchanged and leaves the cache untouched.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::CacheConfig;
use crate::domain::entities::{PinnedItem, User, UserId};
use crate::domain::errors::StoreError;
use crate::domain::repositories::{IPinRepository, IUserRepository};

use super::bounded::BoundedTtlCache;
use super::keys;

/// The two cache instances backing entity reads
///
/// Kept separate on purpose: collections change more often than user
/// records, and staleness in a visible list is worse than staleness in a
/// profile, so each class gets its own capacity and TTL.
pub struct EntityCaches {
    users: RwLock<BoundedTtlCache<Option<User>>>,
    pinned: RwLock<BoundedTtlCache<Vec<PinnedItem>>>,
    user_ttl: Duration,
    pinned_ttl: Duration,
}

impl EntityCaches {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            users: RwLock::new(BoundedTtlCache::new(config.max_entries)),
            pinned: RwLock::new(BoundedTtlCache::new(config.max_entries)),
            user_ttl: Duration::from_secs(config.user_ttl_seconds),
            pinned_ttl: Duration::from_secs(config.pinned_ttl_seconds),
        }
    }

    /// Cached user record, if a live entry exists
    ///
    /// `Some(None)` is a cached "confirmed absent"; `None` is a miss.
    pub async fn user(&self, id: &UserId) -> Option<Option<User>> {
        self.users.write().await.get(&keys::user_key(id))
    }

    /// Cache a user read result, including the absent sentinel
    pub async fn put_user(&self, id: &UserId, user: Option<User>) {
        let ttl = self.user_ttl;
        self.users.write().await.set(&keys::user_key(id), user, ttl);
    }

    pub async fn invalidate_user(&self, id: &UserId) {
        self.users.write().await.remove(&keys::user_key(id));
    }

    /// Cached pinned-poem collection, if a live entry exists
    pub async fn pinned(&self, id: &UserId) -> Option<Vec<PinnedItem>> {
        self.pinned.write().await.get(&keys::pinned_items_key(id))
    }

    pub async fn put_pinned(&self, id: &UserId, items: Vec<PinnedItem>) {
        let ttl = self.pinned_ttl;
        self.pinned
            .write()
            .await
            .set(&keys::pinned_items_key(id), items, ttl);
    }

    pub async fn invalidate_pinned(&self, id: &UserId) {
        self.pinned.write().await.remove(&keys::pinned_items_key(id));
    }

    /// Clear every cache entry scoped to one user across both entity classes
    ///
    /// Used after user deletion, when any surviving entry for that user
    /// would be a dangling read.
    pub async fn invalidate_user_scope(&self, id: &UserId) {
        let removed_users = self
            .users
            .write()
            .await
            .invalidate_matching(|key| keys::is_scoped_to_user(key, id));
        let removed_pinned = self
            .pinned
            .write()
            .await
            .invalidate_matching(|key| keys::is_scoped_to_user(key, id));

        debug!(
            user_id = %id,
            removed = removed_users + removed_pinned,
            "Invalidated user-scoped cache entries"
        );
    }
}

/// Read-through caching decorator for the user port
pub struct CachedUserRepository {
    inner: Arc<dyn IUserRepository>,
    caches: Arc<EntityCaches>,
}

impl CachedUserRepository {
    pub fn new(inner: Arc<dyn IUserRepository>, caches: Arc<EntityCaches>) -> Self {
        Self { inner, caches }
    }
}

#[async_trait]
impl IUserRepository for CachedUserRepository {
    #[tracing::instrument(skip(self), fields(user_id = %id))]
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        if let Some(cached) = self.caches.user(id).await {
            debug!("User cache hit");
            return Ok(cached);
        }

        let fetched = self.inner.find_by_id(id).await?;
        self.caches.put_user(id, fetched.clone()).await;
        Ok(fetched)
    }

    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    async fn upsert(&self, user: &User) -> Result<(), StoreError> {
        self.inner.upsert(user).await?;
        self.caches.invalidate_user(&user.id).await;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(user_id = %id))]
    async fn delete(&self, id: &UserId) -> Result<(), StoreError> {
        self.inner.delete(id).await?;
        self.caches.invalidate_user_scope(id).await;
        Ok(())
    }
}

/// Read-through caching decorator for the pinned-poem port
pub struct CachedPinRepository {
    inner: Arc<dyn IPinRepository>,
    caches: Arc<EntityCaches>,
}

impl CachedPinRepository {
    pub fn new(inner: Arc<dyn IPinRepository>, caches: Arc<EntityCaches>) -> Self {
        Self { inner, caches }
    }
}

#[async_trait]
impl IPinRepository for CachedPinRepository {
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<PinnedItem>, StoreError> {
        if let Some(cached) = self.caches.pinned(user_id).await {
            debug!("Pinned collection cache hit");
            return Ok(cached);
        }

        let fetched = self.inner.list_for_user(user_id).await?;
        self.caches.put_pinned(user_id, fetched.clone()).await;
        Ok(fetched)
    }

    #[tracing::instrument(skip(self, item), fields(user_id = %item.user_id, poem_slug = %item.poem_slug))]
    async fn pin(&self, item: &PinnedItem) -> Result<(), StoreError> {
        self.inner.pin(item).await?;
        self.caches.invalidate_pinned(&item.user_id).await;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id, poem_slug = %poem_slug))]
    async fn unpin(&self, user_id: &UserId, poem_slug: &str) -> Result<(), StoreError> {
        self.inner.unpin(user_id, poem_slug).await?;
        self.caches.invalidate_pinned(user_id).await;
        Ok(())
    }
}
