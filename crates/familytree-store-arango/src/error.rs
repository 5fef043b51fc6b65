//! Error type for `familytree-store-arango`.

use familytree_core::store::StoreError;
use thiserror::Error;

// ArangoDB `errorNum` values this crate reacts to.
pub const ERROR_ARANGO_CONFLICT: i64 = 1200;
pub const ERROR_DOCUMENT_NOT_FOUND: i64 = 1202;
pub const ERROR_DATA_SOURCE_NOT_FOUND: i64 = 1203;
pub const ERROR_DUPLICATE_NAME: i64 = 1207;
pub const ERROR_UNIQUE_CONSTRAINT_VIOLATED: i64 = 1210;
pub const ERROR_DOCUMENT_KEY_BAD: i64 = 1221;
pub const ERROR_DATABASE_NOT_FOUND: i64 = 1228;
pub const ERROR_INVALID_EDGE_ATTRIBUTE: i64 = 1233;
pub const ERROR_QUERY_PARSE: i64 = 1501;
pub const ERROR_QUERY_BIND_PARAMETER_MISSING: i64 = 1551;
pub const ERROR_QUERY_BIND_PARAMETER_UNDECLARED: i64 = 1552;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid configuration: {0}")]
  Config(String),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// A non-2xx answer. `error_num` is 0 when the body carried none.
  #[error("arangodb error {error_num} (HTTP {status}): {message}")]
  Arango {
    status:    u16,
    error_num: i64,
    message:   String,
  },

  #[error("unexpected response: {0}")]
  UnexpectedResponse(String),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[from] StoreError),
}

impl Error {
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Arango { status, .. } => Some(*status),
      Self::Http(e) => e.status().map(|s| s.as_u16()),
      _ => None,
    }
  }

  pub fn error_num(&self) -> Option<i64> {
    match self {
      Self::Arango { error_num, .. } => Some(*error_num),
      _ => None,
    }
  }

  /// "Already exists": another process won a creation race.
  pub fn is_duplicate(&self) -> bool {
    self.error_num() == Some(ERROR_DUPLICATE_NAME) || self.status() == Some(409)
  }

  /// Connect failures and 503s are always safe to retry; timeouts only when
  /// repeating the request cannot apply it twice.
  pub(crate) fn is_retryable(&self, idempotent: bool) -> bool {
    match self {
      Self::Http(e) => e.is_connect() || (idempotent && e.is_timeout()),
      Self::Arango { status, .. } => *status == 503,
      _ => false,
    }
  }
}

impl From<Error> for StoreError {
  fn from(err: Error) -> Self {
    let (error_num, message) = match &err {
      Error::Arango { error_num, message, .. } => (*error_num, message.clone()),
      _ => (0, String::new()),
    };
    match (err, error_num) {
      (Error::Store(inner), _) => inner,
      (Error::Json(e), _) => StoreError::Malformed(e),
      (_, ERROR_DOCUMENT_NOT_FOUND) => StoreError::NotFound,
      (_, ERROR_DATA_SOURCE_NOT_FOUND) => StoreError::UnknownCollection(message),
      (
        _,
        ERROR_ARANGO_CONFLICT | ERROR_DUPLICATE_NAME | ERROR_UNIQUE_CONSTRAINT_VIOLATED,
      ) => StoreError::Conflict(message),
      (
        _,
        ERROR_QUERY_PARSE
        | ERROR_QUERY_BIND_PARAMETER_MISSING
        | ERROR_QUERY_BIND_PARAMETER_UNDECLARED,
      ) => StoreError::InvalidQuery(message),
      (_, ERROR_INVALID_EDGE_ATTRIBUTE | ERROR_DOCUMENT_KEY_BAD) => {
        StoreError::Rejected(message)
      }
      (other, _) => StoreError::backend(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
