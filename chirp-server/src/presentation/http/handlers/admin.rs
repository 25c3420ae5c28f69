use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::posts::PostDto;
use crate::application::admin_service::{RemovedCounts, Stats};
use crate::domain::session::Session;
use crate::domain::user::{UpdateUserRequest, User};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::{AppJson, AppPath};

/// A user as shown to admins: never the password hash.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AdminUserDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<User> for AdminUserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub(crate) struct UpdateUserDto {
    pub(crate) username: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UpdateUserResponseDto {
    pub(crate) success: bool,
    pub(crate) message: String,
    pub(crate) user: AdminUserDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct RemovedDto {
    pub(crate) users: usize,
    pub(crate) posts: usize,
    pub(crate) sessions: usize,
}

impl From<RemovedCounts> for RemovedDto {
    fn from(counts: RemovedCounts) -> Self {
        Self {
            users: counts.users,
            posts: counts.posts,
            sessions: counts.sessions,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AdminActionDto {
    pub(crate) success: bool,
    pub(crate) message: String,
    pub(crate) removed: RemovedDto,
    pub(crate) timestamp: DateTime<Utc>,
}

impl AdminActionDto {
    fn new(message: String, removed: RemovedCounts) -> Self {
        Self {
            success: true,
            message,
            removed: removed.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct StatsDto {
    pub(crate) users: usize,
    pub(crate) posts: usize,
    pub(crate) sessions: usize,
    pub(crate) timestamp: DateTime<Utc>,
}

impl From<Stats> for StatsDto {
    fn from(stats: Stats) -> Self {
        Self {
            users: stats.users,
            posts: stats.posts,
            sessions: stats.sessions,
            timestamp: Utc::now(),
        }
    }
}

/// Session as exported: who and when, never the token.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExportedSessionDto {
    pub(crate) user_id: i64,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Session> for ExportedSessionDto {
    fn from(session: Session) -> Self {
        Self {
            user_id: session.user_id,
            created_at: session.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExportDto {
    pub(crate) users: Vec<AdminUserDto>,
    pub(crate) posts: Vec<PostDto>,
    pub(crate) sessions: Vec<ExportedSessionDto>,
    pub(crate) exported_at: DateTime<Utc>,
}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "admin",
    security(("admin_password" = [])),
    responses(
        (status = 200, description = "Record counts", body = StatsDto),
        (status = 401, description = "Wrong or missing admin password")
    )
)]
pub(crate) async fn stats(State(state): State<AppState>) -> AppResult<Json<StatsDto>> {
    let stats = state.admin_service.stats().await?;
    Ok(Json(stats.into()))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "admin",
    security(("admin_password" = [])),
    responses(
        (status = 200, description = "All users", body = [AdminUserDto]),
        (status = 401, description = "Wrong or missing admin password")
    )
)]
pub(crate) async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<AdminUserDto>>> {
    let users = state.admin_service.list_users().await?;
    Ok(Json(users.into_iter().map(AdminUserDto::from).collect()))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    tag = "admin",
    security(("admin_password" = [])),
    params(
        ("id" = i64, Path, description = "User id")
    ),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = UpdateUserResponseDto),
        (status = 400, description = "Validation error or username/email taken"),
        (status = 401, description = "Wrong or missing admin password"),
        (status = 404, description = "User not found")
    )
)]
pub(crate) async fn update_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(dto): AppJson<UpdateUserDto>,
) -> AppResult<Json<UpdateUserResponseDto>> {
    let req = UpdateUserRequest {
        username: dto.username,
        email: dto.email,
        password: dto.password,
    };

    let user = state.admin_service.update_user(id, req).await?;
    Ok(Json(UpdateUserResponseDto {
        success: true,
        message: format!("user {} updated successfully", user.username),
        user: user.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "admin",
    security(("admin_password" = [])),
    params(
        ("id" = i64, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User and their posts and sessions removed", body = AdminActionDto),
        (status = 401, description = "Wrong or missing admin password"),
        (status = 404, description = "User not found")
    )
)]
pub(crate) async fn delete_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<AdminActionDto>> {
    let (user, removed) = state.admin_service.delete_user(id).await?;
    Ok(Json(AdminActionDto::new(
        format!("user {} deleted successfully", user.username),
        removed,
    )))
}

#[utoipa::path(
    post,
    path = "/api/admin/clear-all",
    tag = "admin",
    security(("admin_password" = [])),
    responses(
        (status = 200, description = "Everything removed", body = AdminActionDto),
        (status = 401, description = "Wrong or missing admin password")
    )
)]
pub(crate) async fn clear_all(State(state): State<AppState>) -> AppResult<Json<AdminActionDto>> {
    let removed = state.admin_service.clear_all().await?;
    Ok(Json(AdminActionDto::new(
        "all data cleared successfully".to_string(),
        removed,
    )))
}

#[utoipa::path(
    post,
    path = "/api/admin/clear-posts",
    tag = "admin",
    security(("admin_password" = [])),
    responses(
        (status = 200, description = "All posts removed", body = AdminActionDto),
        (status = 401, description = "Wrong or missing admin password")
    )
)]
pub(crate) async fn clear_posts(State(state): State<AppState>) -> AppResult<Json<AdminActionDto>> {
    let removed = state.admin_service.clear_posts().await?;
    Ok(Json(AdminActionDto::new(
        format!("{} posts deleted successfully", removed.posts),
        removed,
    )))
}

#[utoipa::path(
    post,
    path = "/api/admin/clear-users",
    tag = "admin",
    security(("admin_password" = [])),
    responses(
        (status = 200, description = "All users with their sessions and posts removed", body = AdminActionDto),
        (status = 401, description = "Wrong or missing admin password")
    )
)]
pub(crate) async fn clear_users(State(state): State<AppState>) -> AppResult<Json<AdminActionDto>> {
    let removed = state.admin_service.clear_users().await?;
    Ok(Json(AdminActionDto::new(
        format!(
            "{} users and {} sessions deleted successfully",
            removed.users, removed.sessions
        ),
        removed,
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/export",
    tag = "admin",
    security(("admin_password" = [])),
    responses(
        (status = 200, description = "Snapshot of all data without secrets", body = ExportDto),
        (status = 401, description = "Wrong or missing admin password")
    )
)]
pub(crate) async fn export(State(state): State<AppState>) -> AppResult<Json<ExportDto>> {
    let export = state.admin_service.export().await?;
    Ok(Json(ExportDto {
        users: export.users.into_iter().map(AdminUserDto::from).collect(),
        posts: export.posts.into_iter().map(PostDto::from).collect(),
        sessions: export
            .sessions
            .into_iter()
            .map(ExportedSessionDto::from)
            .collect(),
        exported_at: Utc::now(),
    }))
}
