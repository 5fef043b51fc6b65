//! The `DocumentStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (`familytree-store-sqlite`,
//! `familytree-store-arango`). Repositories depend on this abstraction, not on
//! any concrete backend. A store handle is shared by every request task and
//! must be usable concurrently without external locking.

use std::future::Future;

use serde_json::Value;
use strum::{AsRefStr, Display};
use thiserror::Error;

use crate::{DocumentMeta, query::DocumentQuery};

/// Vertex collection holding [`Person`](crate::person::Person) documents.
pub const PERSONS: &str = "persons";

/// Edge collection holding [`Relationship`](crate::relationship::Relationship)
/// documents.
pub const RELATIONSHIPS: &str = "relationships";

/// Collections every store provisions when it connects.
pub const REQUIRED_COLLECTIONS: [(&str, CollectionKind); 2] = [
  (PERSONS, CollectionKind::Document),
  (RELATIONSHIPS, CollectionKind::Edge),
];

/// Attributes owned by the store; stripped from every body before a write.
pub const SYSTEM_ATTRIBUTES: [&str; 3] = ["_key", "_id", "_rev"];

// ─── Types ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum CollectionKind {
  /// Plain documents (vertices).
  Document,
  /// Documents that must carry `_from` and `_to` references.
  Edge,
}

/// A document as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
  pub meta: DocumentMeta,
  /// The full body, system attributes included.
  pub body: Value,
}

/// Failure reported by a backend, classified just enough for the repository
/// layer to tell "not found" apart from everything else.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("document not found")]
  NotFound,

  #[error("collection not found: {0}")]
  UnknownCollection(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("invalid query: {0}")]
  InvalidQuery(String),

  /// The store refused the document itself, e.g. an edge without endpoints.
  #[error("document rejected: {0}")]
  Rejected(String),

  #[error("malformed document: {0}")]
  Malformed(#[from] serde_json::Error),

  #[error(transparent)]
  Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
  pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Backend(Box::new(err))
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a document-oriented graph store backend.
///
/// Addresses are `(collection, key)` pairs; the store assigns keys, ids and
/// revisions. All methods return `Send` futures so the trait can be used from
/// a multi-threaded runtime.
pub trait DocumentStore: Send + Sync {
  /// Liveness probe; must succeed before repositories are used.
  fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send + '_;

  /// Create `name` with `kind` unless it already exists. Losing a creation
  /// race to another process is not an error.
  fn ensure_collection<'a>(
    &'a self,
    name: &'a str,
    kind: CollectionKind,
  ) -> impl Future<Output = Result<(), StoreError>> + Send + 'a;

  /// Insert a new document and return the identity the store assigned.
  fn create_document<'a>(
    &'a self,
    collection: &'a str,
    body: Value,
  ) -> impl Future<Output = Result<DocumentMeta, StoreError>> + Send + 'a;

  fn read_document<'a>(
    &'a self,
    collection: &'a str,
    key: &'a str,
  ) -> impl Future<Output = Result<StoredDocument, StoreError>> + Send + 'a;

  /// Replace the whole body of an existing document. The returned revision
  /// differs from the previous one.
  fn replace_document<'a>(
    &'a self,
    collection: &'a str,
    key: &'a str,
    body: Value,
  ) -> impl Future<Output = Result<DocumentMeta, StoreError>> + Send + 'a;

  fn remove_document<'a>(
    &'a self,
    collection: &'a str,
    key: &'a str,
  ) -> impl Future<Output = Result<(), StoreError>> + Send + 'a;

  /// Run `query` and return every matching body, system attributes included,
  /// in store-native order.
  fn query<'a>(
    &'a self,
    query: &'a DocumentQuery,
  ) -> impl Future<Output = Result<Vec<Value>, StoreError>> + Send + 'a;
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Provision [`REQUIRED_COLLECTIONS`]. Idempotent.
pub async fn ensure_required_collections<S>(store: &S) -> Result<(), StoreError>
where
  S: DocumentStore + ?Sized,
{
  for (name, kind) in REQUIRED_COLLECTIONS {
    store.ensure_collection(name, kind).await?;
  }
  Ok(())
}

/// Remove `_key`, `_id` and `_rev` from a body about to be written.
pub fn strip_system_attributes(body: &mut Value) {
  if let Value::Object(map) = body {
    for attr in SYSTEM_ATTRIBUTES {
      map.remove(attr);
    }
  }
}

/// Check the edge invariant: non-empty string `_from` and `_to`.
pub fn check_edge(body: &Value) -> Result<(), StoreError> {
  for attr in ["_from", "_to"] {
    match body.get(attr).and_then(Value::as_str) {
      Some(v) if !v.is_empty() => {}
      _ => {
        return Err(StoreError::Rejected(format!(
          "edge attribute {attr} missing or invalid"
        )));
      }
    }
  }
  Ok(())
}
