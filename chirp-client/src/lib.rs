//! Client library for the chirp server.
//!
//! [`ChirpClient`] wraps the HTTP API and keeps the session token after
//! `register`/`login`. [`feed`] and [`poller`] hold the client-side
//! refresh logic: a fixed-interval poll that pauses while the reader edits,
//! and a full-list reconcile of what it fetches.
#![warn(missing_docs)]

mod error;
pub mod feed;
mod http_client;
mod models;
pub mod poller;

pub use error::{ChirpClientError, ChirpClientResult};
pub use models::{AdminAction, AdminUser, AuthResponse, Post, RecordCounts};

use async_trait::async_trait;
use http_client::HttpClient;
use poller::FeedSource;

#[derive(Debug, Clone)]
/// HTTP client for the chirp API.
pub struct ChirpClient {
    http: HttpClient,
    token: Option<String>,
}

impl ChirpClient {
    /// Creates a client for the server at `base_url`, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: impl Into<String>) -> ChirpClientResult<Self> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
            token: None,
        })
    }

    /// Sets the session token, e.g. one restored from disk.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Current session token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Forgets the session token without contacting the server.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Registers a user and keeps the returned session token.
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ChirpClientResult<AuthResponse> {
        let result = self.http.register(username, email, password).await?;
        self.token = Some(result.token.clone());
        Ok(result)
    }

    /// Logs in by username or email and keeps the returned session token.
    pub async fn login(
        &mut self,
        identifier: &str,
        password: &str,
    ) -> ChirpClientResult<AuthResponse> {
        let result = self.http.login(identifier, password).await?;
        self.token = Some(result.token.clone());
        Ok(result)
    }

    /// Ends the session on the server and forgets the token.
    ///
    /// The token is dropped locally even when the server call fails.
    pub async fn logout(&mut self) -> ChirpClientResult<()> {
        let Some(token) = self.token.take() else {
            return Ok(());
        };
        self.http.logout(&token).await
    }

    /// All posts, newest first.
    pub async fn list_posts(&self) -> ChirpClientResult<Vec<Post>> {
        self.http.list_posts().await
    }

    /// One post by id.
    pub async fn get_post(&self, id: i64) -> ChirpClientResult<Post> {
        self.http.get_post(id).await
    }

    /// Publishes a post. Requires a session token.
    pub async fn create_post(&self, content: &str) -> ChirpClientResult<Post> {
        let token = self.require_token()?;
        self.http.create_post(token, content).await
    }

    /// Replaces the content of one of the caller's posts.
    pub async fn update_post(&self, id: i64, content: &str) -> ChirpClientResult<Post> {
        let token = self.require_token()?;
        self.http.update_post(token, id, content).await
    }

    /// Deletes one of the caller's posts.
    pub async fn delete_post(&self, id: i64) -> ChirpClientResult<()> {
        let token = self.require_token()?;
        self.http.delete_post(token, id).await
    }

    /// Lists users. Needs the admin password, not a session.
    pub async fn admin_list_users(&self, admin_password: &str) -> ChirpClientResult<Vec<AdminUser>> {
        self.http.admin_list_users(admin_password).await
    }

    /// Deletes a user together with their posts and sessions.
    pub async fn admin_delete_user(
        &self,
        admin_password: &str,
        id: i64,
    ) -> ChirpClientResult<AdminAction> {
        self.http.admin_delete_user(admin_password, id).await
    }

    /// Current user, post and session counts.
    pub async fn admin_stats(&self, admin_password: &str) -> ChirpClientResult<RecordCounts> {
        self.http.admin_stats(admin_password).await
    }

    fn require_token(&self) -> ChirpClientResult<&str> {
        self.token.as_deref().ok_or(ChirpClientError::Unauthorized)
    }
}

#[async_trait]
impl FeedSource for ChirpClient {
    async fn fetch_posts(&self) -> ChirpClientResult<Vec<Post>> {
        self.list_posts().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_without_token_fail_before_any_request() {
        let client = ChirpClient::new("http://127.0.0.1:9").expect("client");

        let err = client
            .create_post("hello")
            .await
            .expect_err("no token");
        assert!(matches!(err, ChirpClientError::Unauthorized));
    }

    #[tokio::test]
    async fn logout_without_token_is_a_no_op() {
        let mut client = ChirpClient::new("http://127.0.0.1:9").expect("client");

        client.logout().await.expect("nothing to do");
        assert!(client.token().is_none());
    }

    #[test]
    fn token_can_be_restored_and_cleared() {
        let mut client = ChirpClient::new("http://127.0.0.1:9").expect("client");

        client.set_token("abc");
        assert_eq!(client.token(), Some("abc"));

        client.clear_token();
        assert!(client.token().is_none());
    }
}
