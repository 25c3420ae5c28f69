use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::user::User;

#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub(crate) user: User,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
}

/// Replacement values for an existing user; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub(crate) struct UserPatch {
    pub(crate) username: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) password_hash: Option<String>,
}

#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the username or email is taken.
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError>;
    async fn exists(&self, username: &str, email: &str) -> Result<bool, DomainError>;
    async fn list_users(&self) -> Result<Vec<User>, DomainError>;
    /// Returns `Ok(None)` when no user has this id.
    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<Option<User>, DomainError>;
    async fn delete_user(&self, id: i64) -> Result<Option<User>, DomainError>;
    async fn clear(&self) -> Result<usize, DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
}
