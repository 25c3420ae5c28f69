use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;

pub(crate) const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

/// Gates the admin routes behind the shared secret in `X-Admin-Password`.
pub(crate) async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let supplied = request
        .headers()
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|value| value.to_str().ok());

    if supplied != Some(&*state.admin_password) {
        warn!(path = %request.uri().path(), "rejected admin request");
        return Err(AppError::AdminUnauthorized);
    }

    Ok(next.run(request).await)
}
