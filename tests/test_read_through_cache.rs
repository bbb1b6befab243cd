//! Test suite for the read-through entity caching layer
//!
//! Tests cover:
//! - Read-through population and hit short-circuiting
//! - Negative caching of confirmed-absent users
//! - Synchronous invalidation on every write path
//! - Error propagation from the underlying store

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use verseforge_core::config::CacheConfig;
use verseforge_core::domain::entities::{PinnedItem, User, UserId};
use verseforge_core::domain::errors::StoreError;
use verseforge_core::domain::repositories::{IPinRepository, IUserRepository};
use verseforge_core::infrastructure::cache::{
    CachedPinRepository, CachedUserRepository, EntityCaches,
};

// ============================================================================
// Test Fixtures
// ============================================================================

fn test_user(id: UserId, display_name: &str) -> User {
    let now = Utc::now();
    User {
        id,
        email: format!("{}@example.com", display_name),
        display_name: display_name.to_string(),
        created_at: now,
        updated_at: now,
    }
}

fn test_pin(user_id: UserId, poem_slug: &str) -> PinnedItem {
    PinnedItem {
        id: Uuid::new_v4(),
        user_id,
        poem_slug: poem_slug.to_string(),
        title: poem_slug.replace('-', " "),
        pinned_at: Utc::now(),
    }
}

fn entity_caches() -> Arc<EntityCaches> {
    Arc::new(EntityCaches::new(&CacheConfig::default()))
}

/// In-memory user store that counts reads and can be switched to fail
#[derive(Default)]
struct MockUserRepository {
    users: Mutex<HashMap<UserId, User>>,
    find_calls: AtomicUsize,
    failing: AtomicBool,
}

impl MockUserRepository {
    fn with_user(user: User) -> Self {
        let repo = Self::default();
        repo.users.lock().unwrap().insert(user.id, user);
        repo
    }

    fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl IUserRepository for MockUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Database {
                message: "connection reset".to_string(),
            });
        }
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn upsert(&self, user: &User) -> Result<(), StoreError> {
        self.users.lock().unwrap().insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<(), StoreError> {
        self.users.lock().unwrap().remove(id);
        Ok(())
    }
}

/// In-memory pin store that counts list reads
#[derive(Default)]
struct MockPinRepository {
    pins: Mutex<Vec<PinnedItem>>,
    list_calls: AtomicUsize,
}

impl MockPinRepository {
    fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IPinRepository for MockPinRepository {
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<PinnedItem>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .pins
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == *user_id)
            .cloned()
            .collect())
    }

    async fn pin(&self, item: &PinnedItem) -> Result<(), StoreError> {
        self.pins.lock().unwrap().push(item.clone());
        Ok(())
    }

    async fn unpin(&self, user_id: &UserId, poem_slug: &str) -> Result<(), StoreError> {
        self.pins
            .lock()
            .unwrap()
            .retain(|p| !(p.user_id == *user_id && p.poem_slug == poem_slug));
        Ok(())
    }
}

// ============================================================================
// Read-Through Tests
// ============================================================================

mod read_through_tests {
    use super::*;

    #[tokio::test]
    async fn test_second_read_served_from_cache() {
        let id = UserId::new();
        let inner = Arc::new(MockUserRepository::with_user(test_user(id, "emily")));
        let repo = CachedUserRepository::new(inner.clone(), entity_caches());

        let first = repo.find_by_id(&id).await.unwrap();
        let second = repo.find_by_id(&id).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.find_calls(), 1);
    }

    #[tokio::test]
    async fn test_negative_caching_of_missing_user() {
        let inner = Arc::new(MockUserRepository::default());
        let repo = CachedUserRepository::new(inner.clone(), entity_caches());
        let ghost = UserId::new();

        assert!(repo.find_by_id(&ghost).await.unwrap().is_none());
        assert!(repo.find_by_id(&ghost).await.unwrap().is_none());

        // The confirmed-absent sentinel absorbs the second lookup
        assert_eq!(inner.find_calls(), 1);
    }

    #[tokio::test]
    async fn test_pinned_collection_read_through() {
        let id = UserId::new();
        let inner = Arc::new(MockPinRepository::default());
        let repo = CachedPinRepository::new(inner.clone(), entity_caches());
        repo.pin(&test_pin(id, "ozymandias")).await.unwrap();

        let first = repo.list_for_user(&id).await.unwrap();
        let second = repo.list_for_user(&id).await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
        assert_eq!(inner.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_collection_is_cached_too() {
        let id = UserId::new();
        let inner = Arc::new(MockPinRepository::default());
        let repo = CachedPinRepository::new(inner.clone(), entity_caches());

        assert!(repo.list_for_user(&id).await.unwrap().is_empty());
        assert!(repo.list_for_user(&id).await.unwrap().is_empty());

        assert_eq!(inner.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_store_error_propagates_and_is_not_cached() {
        let id = UserId::new();
        let inner = Arc::new(MockUserRepository::with_user(test_user(id, "walt")));
        let repo = CachedUserRepository::new(inner.clone(), entity_caches());

        inner.set_failing(true);
        assert!(repo.find_by_id(&id).await.is_err());

        // Once the store recovers, the next read goes through and succeeds
        inner.set_failing(false);
        let user = repo.find_by_id(&id).await.unwrap();
        assert_eq!(user.unwrap().display_name, "walt");
        assert_eq!(inner.find_calls(), 2);
    }

    #[tokio::test]
    async fn test_users_cached_independently() {
        let id_a = UserId::new();
        let id_b = UserId::new();
        let inner = Arc::new(MockUserRepository::default());
        {
            let mut users = inner.users.lock().unwrap();
            users.insert(id_a, test_user(id_a, "emily"));
            users.insert(id_b, test_user(id_b, "walt"));
        }
        let repo = CachedUserRepository::new(inner.clone(), entity_caches());

        let a = repo.find_by_id(&id_a).await.unwrap().unwrap();
        let b = repo.find_by_id(&id_b).await.unwrap().unwrap();

        assert_eq!(a.display_name, "emily");
        assert_eq!(b.display_name, "walt");
        assert_eq!(inner.find_calls(), 2);
    }
}

// ============================================================================
// Invalidation Tests
// ============================================================================

mod invalidation_tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_invalidates_cached_user() {
        let id = UserId::new();
        let inner = Arc::new(MockUserRepository::with_user(test_user(id, "emily")));
        let repo = CachedUserRepository::new(inner.clone(), entity_caches());

        let _ = repo.find_by_id(&id).await.unwrap();

        let mut renamed = test_user(id, "emily");
        renamed.display_name = "e. dickinson".to_string();
        repo.upsert(&renamed).await.unwrap();

        let fresh = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(fresh.display_name, "e. dickinson");
        assert_eq!(inner.find_calls(), 2);
    }

    #[tokio::test]
    async fn test_upsert_clears_absent_sentinel() {
        let id = UserId::new();
        let inner = Arc::new(MockUserRepository::default());
        let repo = CachedUserRepository::new(inner.clone(), entity_caches());

        // Miss gets cached as confirmed-absent, then the user is created
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
        repo.upsert(&test_user(id, "sylvia")).await.unwrap();

        assert!(repo.find_by_id(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_clears_every_user_scoped_entry() {
        let id = UserId::new();
        let caches = entity_caches();

        let user_inner = Arc::new(MockUserRepository::with_user(test_user(id, "emily")));
        let user_repo = CachedUserRepository::new(user_inner.clone(), Arc::clone(&caches));
        let pin_inner = Arc::new(MockPinRepository::default());
        let pin_repo = CachedPinRepository::new(pin_inner.clone(), Arc::clone(&caches));
        pin_repo.pin(&test_pin(id, "the-raven")).await.unwrap();

        // Prime both caches for this user
        let _ = user_repo.find_by_id(&id).await.unwrap();
        let _ = pin_repo.list_for_user(&id).await.unwrap();

        user_repo.delete(&id).await.unwrap();

        // Both entity classes re-read from their stores
        assert!(user_repo.find_by_id(&id).await.unwrap().is_none());
        let _ = pin_repo.list_for_user(&id).await.unwrap();
        assert_eq!(user_inner.find_calls(), 2);
        assert_eq!(pin_inner.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_pin_invalidates_collection() {
        let id = UserId::new();
        let inner = Arc::new(MockPinRepository::default());
        let repo = CachedPinRepository::new(inner.clone(), entity_caches());

        assert!(repo.list_for_user(&id).await.unwrap().is_empty());

        repo.pin(&test_pin(id, "ozymandias")).await.unwrap();

        let listed = repo.list_for_user(&id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].poem_slug, "ozymandias");
        assert_eq!(inner.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_unpin_invalidates_collection() {
        let id = UserId::new();
        let inner = Arc::new(MockPinRepository::default());
        let repo = CachedPinRepository::new(inner.clone(), entity_caches());
        repo.pin(&test_pin(id, "ozymandias")).await.unwrap();
        repo.pin(&test_pin(id, "the-raven")).await.unwrap();

        let before = repo.list_for_user(&id).await.unwrap();
        repo.unpin(&id, "ozymandias").await.unwrap();
        let after = repo.list_for_user(&id).await.unwrap();

        assert_eq!(before.len(), 2);
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].poem_slug, "the-raven");
    }

    #[tokio::test]
    async fn test_writes_by_one_user_leave_others_cached() {
        let id_a = UserId::new();
        let id_b = UserId::new();
        let inner = Arc::new(MockPinRepository::default());
        let repo = CachedPinRepository::new(inner.clone(), entity_caches());

        let _ = repo.list_for_user(&id_a).await.unwrap();
        let _ = repo.list_for_user(&id_b).await.unwrap();

        repo.pin(&test_pin(id_a, "ozymandias")).await.unwrap();
        let _ = repo.list_for_user(&id_b).await.unwrap();

        // Only user A's collection was invalidated
        assert_eq!(inner.list_calls(), 2);
    }
}
