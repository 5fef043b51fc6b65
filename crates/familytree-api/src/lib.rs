//! JSON REST API for the family tree.
//!
//! Exposes an axum [`Router`] backed by any [`DocumentStore`]. Auth, TLS, and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let state = AppState::new(Arc::new(store), Duration::from_secs(30));
//! let app = familytree_api::api_router(state);
//! ```

pub mod error;
pub mod extract;
pub mod health;
pub mod persons;
pub mod relationships;
pub mod state;

use axum::{Router, routing::get};
use familytree_core::store::DocumentStore;

pub use error::ApiError;
pub use state::AppState;

/// Build a fully-materialised API router for `state`.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: DocumentStore + 'static,
{
  Router::new()
    // Probes
    .route("/healthz", get(health::live))
    .route("/readyz", get(health::ready::<S>))
    // Persons
    .route("/v1/persons", get(persons::list::<S>).post(persons::create::<S>))
    .route(
      "/v1/persons/{key}",
      get(persons::get_one::<S>)
        .put(persons::update::<S>)
        .delete(persons::delete::<S>),
    )
    .route("/v1/persons/{key}/relationships", get(persons::relationships::<S>))
    // Relationships
    .route(
      "/v1/relationships",
      get(relationships::list::<S>).post(relationships::create::<S>),
    )
    .route(
      "/v1/relationships/{key}",
      get(relationships::get_one::<S>)
        .put(relationships::update::<S>)
        .delete(relationships::delete::<S>),
    )
    .with_state(state)
}
