//! Persistence port errors

/// Errors surfaced by the persistence ports
///
/// The caching layer never masks these: a failed underlying read propagates
/// to the caller unchanged.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {message}")]
    Database { message: String },

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: String },

    #[error("Pinned item not found: {poem_slug}")]
    PinNotFound { poem_slug: String },
}
