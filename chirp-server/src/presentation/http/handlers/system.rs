use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;

const SERVICE_NAME: &str = "chirp";

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct HealthDto {
    pub(crate) status: &'static str,
    pub(crate) message: String,
    pub(crate) environment: String,
    pub(crate) version: &'static str,
    pub(crate) timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ApiIndexDto {
    pub(crate) name: &'static str,
    pub(crate) version: &'static str,
    pub(crate) environment: String,
    pub(crate) endpoints: Vec<&'static str>,
}

const ENDPOINTS: &[&str] = &[
    "GET /api/health",
    "POST /api/register",
    "POST /api/login",
    "POST /api/logout",
    "GET /api/posts",
    "GET /api/posts/{id}",
    "POST /api/posts",
    "PUT /api/posts/{id}",
    "DELETE /api/posts/{id}",
    "GET /api/admin/stats",
    "GET /api/admin/users",
    "PUT /api/admin/users/{id}",
    "DELETE /api/admin/users/{id}",
    "POST /api/admin/clear-all",
    "POST /api/admin/clear-posts",
    "POST /api/admin/clear-users",
    "GET /api/admin/export",
];

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is up", body = HealthDto)
    )
)]
pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok",
        message: format!("{SERVICE_NAME} server is running"),
        environment: state.environment.to_string(),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    })
}

#[utoipa::path(
    get,
    path = "/api",
    tag = "system",
    responses(
        (status = 200, description = "Service description and endpoint list", body = ApiIndexDto)
    )
)]
pub(crate) async fn api_index(State(state): State<AppState>) -> Json<ApiIndexDto> {
    Json(ApiIndexDto {
        name: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        environment: state.environment.to_string(),
        endpoints: ENDPOINTS.to_vec(),
    })
}

pub(crate) async fn not_found() -> AppError {
    AppError::NotFound
}
