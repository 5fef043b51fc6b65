//! Error type for `familytree-store-sqlite`.

use familytree_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[from] StoreError),
}

impl From<Error> for StoreError {
  fn from(err: Error) -> Self {
    match err {
      Error::Store(inner) => inner,
      Error::Json(e) => StoreError::Malformed(e),
      Error::Database(e) => StoreError::backend(e),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
