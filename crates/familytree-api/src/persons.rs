//! Handlers for `/v1/persons` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/v1/persons` | Optional `?firstName=&lastName=` switches to a name search |
//! | `POST`   | `/v1/persons` | Body: [`PersonCreateRequest`] |
//! | `GET`    | `/v1/persons/{key}` | 404 if not found |
//! | `PUT`    | `/v1/persons/{key}` | Body: [`PersonUpdateRequest`] |
//! | `DELETE` | `/v1/persons/{key}` | Relationships are left in place |
//! | `GET`    | `/v1/persons/{key}/relationships` | Edges with the person at either end |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use familytree_core::{
  Error,
  person::{Person, PersonCreateRequest, PersonUpdateRequest},
  store::{DocumentStore, PERSONS},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
  AppState,
  error::ApiError,
  extract::ApiJson,
  relationships::RelationshipsListResponse,
};

#[derive(Debug, Serialize)]
pub struct PersonResponse {
  pub person:  Person,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct PersonsListResponse {
  pub persons: Vec<Person>,
  pub count:   usize,
}

impl From<Vec<Person>> for PersonsListResponse {
  fn from(persons: Vec<Person>) -> Self {
    Self { count: persons.len(), persons }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
}

/// `GET /v1/persons[?firstName=<name>&lastName=<name>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<PersonsListResponse>, ApiError>
where
  S: DocumentStore,
{
  let ctx = state.context();
  let persons = if params.first_name.is_some() || params.last_name.is_some() {
    state
      .persons
      .search_persons_by_name(
        &ctx,
        params.first_name.as_deref().unwrap_or_default(),
        params.last_name.as_deref().unwrap_or_default(),
      )
      .await?
  } else {
    state.persons.list_persons(&ctx).await?
  };
  Ok(Json(persons.into()))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /v1/persons`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<PersonCreateRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
{
  let person = state.persons.create_person(&state.context(), body).await?;
  Ok((
    StatusCode::CREATED,
    Json(PersonResponse { person, message: Some("Person created successfully") }),
  ))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /v1/persons/{key}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(key): Path<String>,
) -> Result<Json<PersonResponse>, ApiError>
where
  S: DocumentStore,
{
  let person = state.persons.get_person(&state.context(), &key).await?;
  Ok(Json(PersonResponse { person, message: None }))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /v1/persons/{key}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(key): Path<String>,
  ApiJson(body): ApiJson<PersonUpdateRequest>,
) -> Result<Json<PersonResponse>, ApiError>
where
  S: DocumentStore,
{
  let person = state
    .persons
    .update_person(&state.context(), &key, body)
    .await?;
  Ok(Json(PersonResponse { person, message: Some("Person updated successfully") }))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /v1/persons/{key}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
{
  state.persons.delete_person(&state.context(), &key).await?;
  Ok(Json(json!({ "message": "Person deleted successfully" })))
}

// ─── Relationships of one person ──────────────────────────────────────────────

/// `GET /v1/persons/{key}/relationships`
pub async fn relationships<S>(
  State(state): State<AppState<S>>,
  Path(key): Path<String>,
) -> Result<Json<RelationshipsListResponse>, ApiError>
where
  S: DocumentStore,
{
  let key = key.trim();
  if key.is_empty() {
    return Err(Error::validation("person ID is required").into());
  }
  let person_id = format!("{PERSONS}/{key}");
  let relationships = state
    .relationships
    .relationships_for_person(&state.context(), &person_id)
    .await?;
  Ok(Json(relationships.into()))
}
