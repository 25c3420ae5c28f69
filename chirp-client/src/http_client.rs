use reqwest::{Client, Method, RequestBuilder};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ChirpClientError, ChirpClientResult};
use crate::models::{AdminAction, AdminUser, AuthResponse, Post, RecordCounts};

const ADMIN_PASSWORD_HEADER: &str = "X-Admin-Password";

#[derive(Debug, Serialize)]
struct RegisterRequestDto<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

/// The server reads `email` as "email or username".
#[derive(Debug, Serialize)]
struct LoginRequestDto<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct ContentDto<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
}

#[derive(Debug, Clone)]
/// Thin `reqwest` wrapper over the chirp REST API.
pub(crate) struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    pub(crate) fn new(base_url: impl Into<String>) -> ChirpClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn decode_error(response: reqwest::Response) -> ChirpClientError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body
                .error
                .unwrap_or_else(|| format!("http status {status}")),
            Err(_) => format!("http status {status}"),
        };
        ChirpClientError::from_http_status(status, Some(message))
    }

    /// Sends a prepared request and decodes a JSON success body.
    async fn execute<TRes>(&self, request: RequestBuilder) -> ChirpClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .map_err(ChirpClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        response
            .json::<TRes>()
            .await
            .map_err(ChirpClientError::from_reqwest)
    }

    async fn send_json<TReq, TRes>(
        &self,
        method: Method,
        path: &str,
        body: &TReq,
        token: Option<&str>,
    ) -> ChirpClientResult<TRes>
    where
        TReq: Serialize,
        TRes: DeserializeOwned,
    {
        let mut request = self.client.request(method, self.endpoint(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        self.execute(request).await
    }

    fn admin_request(&self, method: Method, path: &str, admin_password: &str) -> RequestBuilder {
        self.client
            .request(method, self.endpoint(path))
            .header(ADMIN_PASSWORD_HEADER, admin_password)
    }

    pub(crate) async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ChirpClientResult<AuthResponse> {
        let payload = RegisterRequestDto {
            username,
            email,
            password,
        };
        self.send_json(Method::POST, "/api/register", &payload, None)
            .await
    }

    pub(crate) async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> ChirpClientResult<AuthResponse> {
        let payload = LoginRequestDto {
            email: identifier,
            password,
        };
        self.send_json(Method::POST, "/api/login", &payload, None)
            .await
    }

    pub(crate) async fn logout(&self, token: &str) -> ChirpClientResult<()> {
        let request = self
            .client
            .request(Method::POST, self.endpoint("/api/logout"))
            .bearer_auth(token);
        let _: IgnoredAny = self.execute(request).await?;
        Ok(())
    }

    pub(crate) async fn list_posts(&self) -> ChirpClientResult<Vec<Post>> {
        let request = self.client.request(Method::GET, self.endpoint("/api/posts"));
        self.execute(request).await
    }

    pub(crate) async fn get_post(&self, id: i64) -> ChirpClientResult<Post> {
        let request = self
            .client
            .request(Method::GET, self.endpoint(&format!("/api/posts/{id}")));
        self.execute(request).await
    }

    pub(crate) async fn create_post(&self, token: &str, content: &str) -> ChirpClientResult<Post> {
        self.send_json(
            Method::POST,
            "/api/posts",
            &ContentDto { content },
            Some(token),
        )
        .await
    }

    pub(crate) async fn update_post(
        &self,
        token: &str,
        id: i64,
        content: &str,
    ) -> ChirpClientResult<Post> {
        self.send_json(
            Method::PUT,
            &format!("/api/posts/{id}"),
            &ContentDto { content },
            Some(token),
        )
        .await
    }

    pub(crate) async fn delete_post(&self, token: &str, id: i64) -> ChirpClientResult<()> {
        let request = self
            .client
            .request(Method::DELETE, self.endpoint(&format!("/api/posts/{id}")))
            .bearer_auth(token);
        let _: IgnoredAny = self.execute(request).await?;
        Ok(())
    }

    pub(crate) async fn admin_list_users(
        &self,
        admin_password: &str,
    ) -> ChirpClientResult<Vec<AdminUser>> {
        let request = self.admin_request(Method::GET, "/api/admin/users", admin_password);
        self.execute(request).await
    }

    pub(crate) async fn admin_delete_user(
        &self,
        admin_password: &str,
        id: i64,
    ) -> ChirpClientResult<AdminAction> {
        let request = self.admin_request(
            Method::DELETE,
            &format!("/api/admin/users/{id}"),
            admin_password,
        );
        self.execute(request).await
    }

    pub(crate) async fn admin_stats(&self, admin_password: &str) -> ChirpClientResult<RecordCounts> {
        let request = self.admin_request(Method::GET, "/api/admin/stats", admin_password);
        self.execute(request).await
    }
}
