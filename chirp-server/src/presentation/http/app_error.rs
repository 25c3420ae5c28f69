use crate::domain::error::DomainError;
use crate::presentation::AppState;
use axum::{
    Json,
    extract::{
        Request, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("authentication required")]
    Unauthorized,

    #[error("admin authentication required")]
    AdminUnauthorized,

    #[error("endpoint not found")]
    NotFound,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            AppError::Domain(err) => match &err {
                DomainError::Validation { .. } | DomainError::AlreadyExists(_) => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                DomainError::InvalidCredentials => (StatusCode::UNAUTHORIZED, err.to_string()),
                DomainError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                DomainError::Forbidden => (StatusCode::FORBIDDEN, err.to_string()),
                DomainError::Unexpected(detail) => return internal_response(detail.clone()),
            },
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, describe_validation(&err)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "authentication required".to_string()),
            AppError::AdminUnauthorized => (
                StatusCode::UNAUTHORIZED,
                "admin authentication required".to_string(),
            ),
            AppError::NotFound => (StatusCode::NOT_FOUND, "endpoint not found".to_string()),
            AppError::Internal(err) => return internal_response(format!("{err:#}")),
        };

        (status, Json(ErrorBody { error: msg })).into_response()
    }
}

/// Underlying text of a 500, kept out of the body and carried on the
/// response for [`internal_error_detail_middleware`].
#[derive(Debug, Clone)]
struct InternalErrorDetail(String);

fn internal_response(detail: String) -> Response {
    error!(error = %detail, "request failed with internal error");
    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "internal error".to_string(),
        }),
    )
        .into_response();
    response.extensions_mut().insert(InternalErrorDetail(detail));
    response
}

/// Puts the underlying error text back into 500 bodies when the state
/// allows it (development only).
pub(crate) async fn internal_error_detail_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    if !state.expose_internal_errors {
        return response;
    }
    match response.extensions_mut().remove::<InternalErrorDetail>() {
        Some(InternalErrorDetail(detail)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody { error: detail }),
        )
            .into_response(),
        None => response,
    }
}

fn describe_validation(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<&str> = field_errors.keys().map(|field| field.as_ref()).collect();
    fields.sort_unstable();
    format!("validation failed for '{}': must not be empty", fields.join(", "))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use axum::{Router, middleware, routing::get};
    use serde_json::Value;
    use tower::ServiceExt;
    use validator::Validate;

    use super::{AppError, describe_validation, internal_error_detail_middleware};
    use crate::domain::error::DomainError;
    use crate::infrastructure::password::cheap_hasher;
    use crate::presentation::AppState;

    async fn failing() -> Result<(), AppError> {
        Err(DomainError::Unexpected("store lock poisoned".to_string()).into())
    }

    async fn error_body(environment: &str) -> (StatusCode, Value) {
        let state = AppState::in_memory(cheap_hasher(), "secret", environment);
        let app = Router::new()
            .route("/boom", get(failing))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                internal_error_detail_middleware,
            ))
            .with_state(state);

        let response = app
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn internal_detail_is_hidden_outside_development() {
        let (status, body) = error_body("production").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal error");
    }

    #[tokio::test]
    async fn internal_detail_is_shown_in_development() {
        let (status, body) = error_body("development").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "store lock poisoned");
    }

    #[derive(Validate)]
    struct Named {
        #[validate(length(min = 1))]
        username: String,
    }

    #[test]
    fn validation_message_names_fields_only() {
        let err = Named {
            username: String::new(),
        }
        .validate()
        .expect_err("empty username");

        assert_eq!(
            describe_validation(&err),
            "validation failed for 'username': must not be empty"
        );
    }
}
