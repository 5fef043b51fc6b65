//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use familytree_core::{Error, store::StoreError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Domain(#[from] Error),

  #[error("store unavailable: {0}")]
  Unavailable(#[source] StoreError),

  /// The body was not JSON, or not the shape the handler expects.
  #[error("invalid request body: {0}")]
  InvalidBody(#[from] JsonRejection),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::Domain(Error::Validation(_)) | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
      Self::Domain(Error::NotFound { .. }) => StatusCode::NOT_FOUND,
      Self::Domain(Error::Cancelled) | Self::Unavailable(_) => {
        StatusCode::SERVICE_UNAVAILABLE
      }
      Self::Domain(Error::DeadlineExceeded) => StatusCode::GATEWAY_TIMEOUT,
      Self::Domain(Error::Persistence { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
