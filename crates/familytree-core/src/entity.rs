//! The capability contract an entity must satisfy to be stored by a
//! [`DocumentRepository`](crate::repository::DocumentRepository).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Store-assigned identity of a document.
///
/// Only ever produced from a store response; callers never build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
  #[serde(rename = "_key")]
  pub key: String,
  #[serde(rename = "_id")]
  pub id:  String,
  #[serde(rename = "_rev")]
  pub rev: String,
}

/// A value that can be persisted as a single document.
///
/// Implementors serialise their identity fields as `_key`, `_id` and `_rev`,
/// omitting them while unset, so that a freshly-loaded document carries its
/// identity and a transient entity carries none.
pub trait Entity:
  Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
  /// Overwrite the identity triple with the one the store just returned.
  fn set_metadata(&mut self, meta: DocumentMeta);

  fn set_timestamps(
    &mut self,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
  );

  fn created_at(&self) -> Option<DateTime<Utc>>;

  fn updated_at(&self) -> Option<DateTime<Utc>>;
}
