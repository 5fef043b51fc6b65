//! Handlers for `/v1/relationships` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/v1/relationships` | Optional `?personId=<id>` and/or `?type=<type>` |
//! | `POST`   | `/v1/relationships` | Body: [`RelationshipCreateRequest`] |
//! | `GET`    | `/v1/relationships/{key}` | 404 if not found |
//! | `PUT`    | `/v1/relationships/{key}` | Body: [`RelationshipUpdateRequest`] |
//! | `DELETE` | `/v1/relationships/{key}` | |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use familytree_core::{
  Error,
  relationship::{Relationship, RelationshipCreateRequest, RelationshipUpdateRequest},
  store::DocumentStore,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{AppState, error::ApiError, extract::ApiJson};

#[derive(Debug, Serialize)]
pub struct RelationshipResponse {
  pub relationship: Relationship,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message:      Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct RelationshipsListResponse {
  pub relationships: Vec<Relationship>,
  pub count:         usize,
}

impl From<Vec<Relationship>> for RelationshipsListResponse {
  fn from(relationships: Vec<Relationship>) -> Self {
    Self { count: relationships.len(), relationships }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub person_id: Option<String>,
  #[serde(rename = "type")]
  pub relation_type: Option<String>,
}

/// `GET /v1/relationships[?personId=<id>][&type=<type>]`
///
/// With both parameters the person's edges are narrowed to the type. A
/// blank `type` is rejected either way.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<RelationshipsListResponse>, ApiError>
where
  S: DocumentStore,
{
  let ctx = state.context();
  let service = &state.relationships;
  if let Some(kind) = &params.relation_type
    && kind.trim().is_empty()
  {
    return Err(Error::validation("relationship type is required").into());
  }
  let relationships = match (params.person_id, params.relation_type) {
    (Some(person_id), relation_type) => {
      let mut found = service.relationships_for_person(&ctx, &person_id).await?;
      if let Some(kind) = relation_type {
        let kind = kind.trim();
        found.retain(|r| r.relation_type == kind);
      }
      found
    }
    (None, Some(kind)) => service.relationships_by_type(&ctx, &kind).await?,
    (None, None) => service.list_relationships(&ctx).await?,
  };
  Ok(Json(relationships.into()))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /v1/relationships`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<RelationshipCreateRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
{
  let relationship = state
    .relationships
    .create_relationship(&state.context(), body)
    .await?;
  Ok((
    StatusCode::CREATED,
    Json(RelationshipResponse {
      relationship,
      message: Some("Relationship created successfully"),
    }),
  ))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /v1/relationships/{key}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(key): Path<String>,
) -> Result<Json<RelationshipResponse>, ApiError>
where
  S: DocumentStore,
{
  let relationship = state
    .relationships
    .get_relationship(&state.context(), &key)
    .await?;
  Ok(Json(RelationshipResponse { relationship, message: None }))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /v1/relationships/{key}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(key): Path<String>,
  ApiJson(body): ApiJson<RelationshipUpdateRequest>,
) -> Result<Json<RelationshipResponse>, ApiError>
where
  S: DocumentStore,
{
  let relationship = state
    .relationships
    .update_relationship(&state.context(), &key, body)
    .await?;
  Ok(Json(RelationshipResponse {
    relationship,
    message: Some("Relationship updated successfully"),
  }))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /v1/relationships/{key}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
{
  state
    .relationships
    .delete_relationship(&state.context(), &key)
    .await?;
  Ok(Json(json!({ "message": "Relationship deleted successfully" })))
}
