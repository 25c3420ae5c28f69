use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::MessageDto;
use crate::domain::post::{CreatePostRequest, Post, UpdatePostRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::{AppJson, AppPath};
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 1))]
    pub(crate) content: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub(crate) struct UpdatePostDto {
    pub(crate) content: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) author_id: Option<i64>,
    pub(crate) username: String,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) edited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) edited_at: Option<DateTime<Utc>>,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            username: post.username,
            content: post.content,
            created_at: post.created_at,
            edited: post.edited,
            edited_at: post.edited_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    responses(
        (status = 200, description = "All posts, newest first", body = [PostDto]),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(State(state): State<AppState>) -> AppResult<Json<Vec<PostDto>>> {
    let posts = state.post_service.list_posts().await?;
    Ok(Json(posts.into_iter().map(PostDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<PostDto>> {
    let post = state.post_service.get_post(id).await?;
    Ok(Json(PostDto::from(post)))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthenticated"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppJson(dto): AppJson<CreatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;
    let req = CreatePostRequest {
        content: dto.content,
    };

    let post = state.post_service.create_post(&auth.user, req).await?;
    Ok((StatusCode::CREATED, Json(PostDto::from(post))))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i64>,
    AppJson(dto): AppJson<UpdatePostDto>,
) -> AppResult<Json<PostDto>> {
    // content is validated after the ownership checks in the service
    let req = UpdatePostRequest {
        content: dto.content,
    };

    let post = state.post_service.update_post(&auth.user, id, req).await?;
    Ok(Json(PostDto::from(post)))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post deleted", body = MessageDto),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<MessageDto>> {
    state.post_service.delete_post(&auth.user, id).await?;
    Ok(Json(MessageDto::new("post deleted successfully")))
}
