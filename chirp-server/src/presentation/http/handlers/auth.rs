use axum::{Json, extract::State, http::HeaderMap, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::MessageDto;
use crate::application::auth_service::AuthResult;
use crate::domain::user::{LoginRequest, RegisterRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppError, AppResult};
use crate::presentation::http::extract::AppJson;
use crate::presentation::http::middleware::auth::bearer_token;

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub(crate) struct RegisterDto {
    #[validate(length(min = 1))]
    pub(crate) username: String,
    #[validate(length(min = 1))]
    pub(crate) email: String,
    #[validate(length(min = 1))]
    pub(crate) password: String,
}

/// `email` may hold either the email or the username; `username` is
/// accepted as an alias.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub(crate) struct LoginDto {
    pub(crate) email: Option<String>,
    pub(crate) username: Option<String>,
    #[validate(length(min = 1))]
    pub(crate) password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthResponseDto {
    pub(crate) token: String,
    pub(crate) username: String,
    pub(crate) message: String,
}

impl AuthResponseDto {
    fn new(result: AuthResult, message: &str) -> Self {
        Self {
            token: result.token,
            username: result.user.username,
            message: message.to_string(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/register",
    tag = "auth",
    request_body = RegisterDto,
    responses(
        (status = 201, description = "Registered and logged in", body = AuthResponseDto),
        (status = 400, description = "Validation error or user already exists"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    AppJson(dto): AppJson<RegisterDto>,
) -> AppResult<(StatusCode, Json<AuthResponseDto>)> {
    dto.validate()?;

    let req = RegisterRequest {
        username: dto.username,
        email: dto.email,
        password: dto.password,
    };

    let result = state.auth_service.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponseDto::new(result, "user registered successfully")),
    ))
}

#[utoipa::path(
    post,
    path = "/api/login",
    tag = "auth",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Login successful", body = AuthResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    AppJson(dto): AppJson<LoginDto>,
) -> AppResult<(StatusCode, Json<AuthResponseDto>)> {
    dto.validate()?;

    let req = LoginRequest {
        identifier: dto
            .email
            .filter(|value| !value.trim().is_empty())
            .or(dto.username)
            .unwrap_or_default(),
        password: dto.password,
    };

    let result = state.auth_service.login(req).await?;

    Ok((
        StatusCode::OK,
        Json(AuthResponseDto::new(result, "login successful")),
    ))
}

#[utoipa::path(
    post,
    path = "/api/logout",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Session closed (or already gone)", body = MessageDto),
        (status = 401, description = "No bearer token supplied")
    )
)]
pub(crate) async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<MessageDto>> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    state.auth_service.logout(token).await?;
    Ok(Json(MessageDto::new("logged out")))
}
