use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::presentation::AppState;
use crate::presentation::http::handlers::admin::{
    clear_all, clear_posts, clear_users, delete_user, export, list_users, stats, update_user,
};
use crate::presentation::http::middleware::admin::admin_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/users", get(list_users))
        .route("/users/{id}", put(update_user).delete(delete_user))
        .route("/clear-all", post(clear_all))
        .route("/clear-posts", post(clear_posts))
        .route("/clear-users", post(clear_users))
        .route("/export", get(export))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
