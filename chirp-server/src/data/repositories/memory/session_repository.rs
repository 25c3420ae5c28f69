use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::data::session_repository::SessionRepository;
use crate::domain::error::DomainError;
use crate::domain::session::Session;
use crate::infrastructure::token::generate_session_token;

#[derive(Debug, Clone, Default)]
pub(crate) struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessionRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create_session(&self, user_id: i64) -> Result<Session, DomainError> {
        let mut sessions = self.sessions.write().await;
        // 256 random bits make a collision practically impossible, but a
        // token must never map to two sessions.
        let token = loop {
            let candidate = generate_session_token();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };

        let session = Session {
            token: token.clone(),
            user_id,
            created_at: Utc::now(),
        };
        sessions.insert(token, session.clone());
        Ok(session)
    }

    async fn find_session(&self, token: &str) -> Result<Option<Session>, DomainError> {
        Ok(self.sessions.read().await.get(token).cloned())
    }

    async fn remove_session(&self, token: &str) -> Result<bool, DomainError> {
        Ok(self.sessions.write().await.remove(token).is_some())
    }

    async fn remove_by_user(&self, user_id: i64) -> Result<usize, DomainError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.user_id != user_id);
        Ok(before - sessions.len())
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, DomainError> {
        let mut sessions: Vec<Session> = self.sessions.read().await.values().cloned().collect();
        sessions.sort_by_key(|session| session.created_at);
        Ok(sessions)
    }

    async fn clear(&self) -> Result<usize, DomainError> {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.len();
        sessions.clear();
        Ok(removed)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.sessions.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::InMemorySessionRepository;
    use crate::data::session_repository::SessionRepository;

    #[tokio::test]
    async fn sessions_are_distinct_per_login() {
        let repo = InMemorySessionRepository::new();

        let first = repo.create_session(1).await.expect("first");
        let second = repo.create_session(1).await.expect("second");

        assert_ne!(first.token, second.token);
        assert_eq!(repo.count().await.expect("count"), 2);
        assert_eq!(
            repo.find_session(&first.token).await.expect("find"),
            Some(first)
        );
    }

    #[tokio::test]
    async fn remove_session_is_idempotent() {
        let repo = InMemorySessionRepository::new();
        let session = repo.create_session(1).await.expect("session");

        assert!(repo.remove_session(&session.token).await.expect("remove"));
        assert!(!repo.remove_session(&session.token).await.expect("remove again"));
        assert!(repo.find_session(&session.token).await.expect("find").is_none());
    }

    #[tokio::test]
    async fn remove_by_user_only_touches_that_user() {
        let repo = InMemorySessionRepository::new();
        repo.create_session(1).await.expect("s1");
        repo.create_session(1).await.expect("s2");
        let other = repo.create_session(2).await.expect("s3");

        assert_eq!(repo.remove_by_user(1).await.expect("remove"), 2);
        assert_eq!(repo.count().await.expect("count"), 1);
        assert!(repo.find_session(&other.token).await.expect("find").is_some());
    }
}
