use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by `chirp-client`.
pub enum ChirpClientError {
    /// Transport failure or an undecodable response body (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Missing, unknown or logged-out session token, or a wrong admin password.
    #[error("unauthorized")]
    Unauthorized,

    /// Authenticated, but not allowed to touch the resource.
    #[error("forbidden")]
    Forbidden,

    /// The post or user does not exist.
    #[error("not found")]
    NotFound,

    /// The server rejected the input, or the client refused to send it.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result of `chirp-client` operations.
pub type ChirpClientResult<T> = Result<T, ChirpClientError>;

impl ChirpClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        match status {
            reqwest::StatusCode::UNAUTHORIZED => Self::Unauthorized,
            reqwest::StatusCode::FORBIDDEN => Self::Forbidden,
            reqwest::StatusCode::NOT_FOUND => Self::NotFound,
            _ => {
                let message = message.unwrap_or_else(|| format!("http status {status}"));
                Self::InvalidRequest(message)
            }
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None);
        }
        Self::Http(err)
    }
}
