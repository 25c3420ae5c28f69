use axum::{Router, middleware, routing::get};

use crate::presentation::AppState;
use crate::presentation::http::app_error::internal_error_detail_middleware;
use crate::presentation::http::handlers::system::{api_index, health, not_found};

pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod posts;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(api_index))
        .route("/api/health", get(health))
        .nest("/api", auth::router())
        .nest("/api/posts", posts::router(state.clone()))
        .nest("/api/admin", admin::router(state.clone()))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            internal_error_detail_middleware,
        ))
        .with_state(state)
}
