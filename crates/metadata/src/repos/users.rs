//! User account repository.

use crate::error::MetadataResult;
use crate::models::UserRow;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository for user account operations.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Create a new user. Fails with `AlreadyExists` on a duplicate
    /// username or email.
    async fn create_user(&self, user: &UserRow) -> MetadataResult<()>;

    /// Get a user by ID.
    async fn get_user(&self, user_id: Uuid) -> MetadataResult<Option<UserRow>>;

    /// Get a user by username.
    async fn get_user_by_username(&self, username: &str) -> MetadataResult<Option<UserRow>>;

    /// Get a user by email.
    async fn get_user_by_email(&self, email: &str) -> MetadataResult<Option<UserRow>>;

    /// List all users, ordered by username.
    async fn list_users(&self) -> MetadataResult<Vec<UserRow>>;

    /// Update a user's admin-editable fields (names, flags). Fails with
    /// `NotFound` if the user does not exist.
    async fn update_user(&self, user: &UserRow) -> MetadataResult<()>;
}
