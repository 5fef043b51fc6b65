//! Request extractors whose rejections render as [`ApiError`].

use axum::extract::FromRequest;

use crate::error::ApiError;

/// [`axum::Json`] with a JSON `{"error"}` body and `400` on rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
