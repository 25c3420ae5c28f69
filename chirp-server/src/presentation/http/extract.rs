use axum::extract::{FromRequest, FromRequestParts};

use super::app_error::AppError;

/// `axum::Json` whose rejections render as the API's JSON error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub(crate) struct AppJson<T>(pub(crate) T);

/// `axum::extract::Path` with JSON error rejections.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub(crate) struct AppPath<T>(pub(crate) T);
