use axum::{Router, routing::post};

use crate::presentation::AppState;
use crate::presentation::http::handlers::auth::{login, logout, register};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}
