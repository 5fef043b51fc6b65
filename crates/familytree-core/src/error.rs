//! Error types for `familytree-core`.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum Error {
  /// Caller-supplied data violates a precondition. Raised before the store
  /// is contacted.
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("{collection} document not found: {id}")]
  NotFound {
    collection: &'static str,
    id:         String,
  },

  #[error("{operation} on {collection} failed: {source}")]
  Persistence {
    operation:  &'static str,
    collection: &'static str,
    #[source]
    source:     StoreError,
  },

  #[error("operation cancelled")]
  Cancelled,

  #[error("operation deadline exceeded")]
  DeadlineExceeded,
}

impl Error {
  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }

  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound { .. }) }

  pub fn is_validation(&self) -> bool { matches!(self, Self::Validation(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
