//! Cache key composition

use crate::domain::entities::UserId;

/// Cache key for a single user record
pub fn user_key(id: &UserId) -> String {
    format!("user:{}", id)
}

/// Cache key for a user's pinned-poem collection
pub fn pinned_items_key(id: &UserId) -> String {
    format!("pinned:{}", id)
}

/// Whether a cache key belongs to the given user, regardless of entity class
pub fn is_scoped_to_user(key: &str, id: &UserId) -> bool {
    key.rsplit_once(':')
        .is_some_and(|(_, owner)| owner == id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_matches_both_entity_classes() {
        let id = UserId::new();
        assert!(is_scoped_to_user(&user_key(&id), &id));
        assert!(is_scoped_to_user(&pinned_items_key(&id), &id));
        assert!(!is_scoped_to_user(&user_key(&UserId::new()), &id));
    }
}
