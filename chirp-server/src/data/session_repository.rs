use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::session::Session;

#[async_trait]
pub(crate) trait SessionRepository: Send + Sync {
    async fn create_session(&self, user_id: i64) -> Result<Session, DomainError>;
    async fn find_session(&self, token: &str) -> Result<Option<Session>, DomainError>;
    async fn remove_session(&self, token: &str) -> Result<bool, DomainError>;
    async fn remove_by_user(&self, user_id: i64) -> Result<usize, DomainError>;
    async fn list_sessions(&self) -> Result<Vec<Session>, DomainError>;
    async fn clear(&self) -> Result<usize, DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
}
