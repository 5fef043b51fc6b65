//! Liveness and readiness probes.

use axum::{Json, extract::State};
use familytree_core::{Error, store::DocumentStore};
use serde_json::{Value, json};

use crate::{AppState, error::ApiError};

/// `GET /healthz`: the process is up.
pub async fn live() -> Json<Value> { Json(json!({ "status": "ok" })) }

/// `GET /readyz`: the store answers a ping within the request timeout.
pub async fn ready<S>(State(state): State<AppState<S>>) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore,
{
  match tokio::time::timeout(state.request_timeout, state.store.ping()).await {
    Ok(Ok(())) => Ok(Json(json!({ "status": "ready" }))),
    Ok(Err(e)) => Err(ApiError::Unavailable(e)),
    Err(_) => Err(Error::DeadlineExceeded.into()),
  }
}
