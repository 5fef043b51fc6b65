//! [`DocumentRepository`]: CRUD for any [`Entity`] over a [`DocumentStore`].

use std::{marker::PhantomData, sync::Arc};

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;
use tracing::debug;

use super::Repository;
use crate::{
  Entity, Error, OpContext, Result,
  query::DocumentQuery,
  store::{DocumentStore, StoreError, strip_system_attributes},
};

/// Longest key the stores accept, in bytes.
const MAX_KEY_LEN: usize = 254;

/// Maps entities of type `E` onto one collection of `S`.
///
/// Cloning is cheap: the store handle is reference-counted.
pub struct DocumentRepository<E, S> {
  store:      Arc<S>,
  collection: &'static str,
  _entity:    PhantomData<fn() -> E>,
}

impl<E, S> Clone for DocumentRepository<E, S> {
  fn clone(&self) -> Self {
    Self {
      store:      Arc::clone(&self.store),
      collection: self.collection,
      _entity:    PhantomData,
    }
  }
}

impl<E: Entity, S: DocumentStore> DocumentRepository<E, S> {
  pub fn new(store: Arc<S>, collection: &'static str) -> Self {
    Self { store, collection, _entity: PhantomData }
  }

  /// Turn a caller-supplied address (`key` or `collection/key`) into a key.
  ///
  /// An id naming another collection cannot exist here and is reported as
  /// not found.
  fn resolve_key<'i>(&self, id: &'i str) -> Result<&'i str> {
    let id = id.trim();
    let key = match id.split_once('/') {
      Some((collection, key)) if collection == self.collection => key,
      Some(_) => {
        return Err(Error::NotFound {
          collection: self.collection,
          id:         id.to_owned(),
        });
      }
      None => id,
    };
    if key.is_empty() {
      return Err(Error::validation(format!("{} id is required", self.collection)));
    }
    if key.len() > MAX_KEY_LEN || !key.chars().all(is_key_char) {
      return Err(Error::validation(format!("invalid document key {key:?}")));
    }
    Ok(key)
  }

  /// Run a parameterised query against this collection and materialise every
  /// result. `operation` names the caller in errors and logs.
  pub async fn find(
    &self,
    ctx: &OpContext,
    query: DocumentQuery,
    operation: &'static str,
  ) -> Result<Vec<E>> {
    query
      .validate()
      .map_err(|e| self.failure(operation, None, e))?;

    let rows = ctx
      .run(async {
        self
          .store
          .query(&query)
          .await
          .map_err(|e| self.failure(operation, None, e))
      })
      .await?;

    debug!(collection = self.collection, operation, count = rows.len(), "query returned");

    rows
      .into_iter()
      .map(|row| self.decode(operation, row))
      .collect()
  }

  fn encode(&self, operation: &'static str, entity: &E) -> Result<Value> {
    let mut body = serde_json::to_value(entity)
      .map_err(|e| self.failure(operation, None, e.into()))?;
    strip_system_attributes(&mut body);
    Ok(body)
  }

  fn decode(&self, operation: &'static str, body: Value) -> Result<E> {
    serde_json::from_value(body).map_err(|e| self.failure(operation, None, e.into()))
  }

  /// Classify a store failure. "Not found" is only meaningful when a specific
  /// document was addressed.
  fn failure(&self, operation: &'static str, id: Option<&str>, err: StoreError) -> Error {
    match (err, id) {
      (StoreError::NotFound, Some(id)) => Error::NotFound {
        collection: self.collection,
        id:         id.trim().to_owned(),
      },
      (source, _) => Error::Persistence {
        operation,
        collection: self.collection,
        source,
      },
    }
  }
}

impl<E: Entity, S: DocumentStore> Repository<E> for DocumentRepository<E, S> {
  async fn create(&self, ctx: &OpContext, entity: &mut E) -> Result<()> {
    let now = Utc::now();
    let mut staged = entity.clone();
    staged.set_timestamps(now, now);
    let body = self.encode("create", &staged)?;

    let meta = ctx
      .run(async {
        self
          .store
          .create_document(self.collection, body)
          .await
          .map_err(|e| self.failure("create", None, e))
      })
      .await?;

    debug!(collection = self.collection, key = %meta.key, rev = %meta.rev, "document created");
    staged.set_metadata(meta);
    *entity = staged;
    Ok(())
  }

  async fn get_by_id(&self, ctx: &OpContext, id: &str) -> Result<E> {
    let key = self.resolve_key(id)?;

    let doc = ctx
      .run(async {
        self
          .store
          .read_document(self.collection, key)
          .await
          .map_err(|e| self.failure("get_by_id", Some(id), e))
      })
      .await?;

    let mut entity = self.decode("get_by_id", doc.body)?;
    entity.set_metadata(doc.meta);
    Ok(entity)
  }

  async fn update(&self, ctx: &OpContext, id: &str, entity: &mut E) -> Result<()> {
    let key = self.resolve_key(id)?;

    let now = next_timestamp(entity.updated_at());
    let created_at = entity
      .created_at()
      .or(entity.updated_at())
      .unwrap_or(now);
    let mut staged = entity.clone();
    staged.set_timestamps(created_at, now);
    let body = self.encode("update", &staged)?;

    let meta = ctx
      .run(async {
        self
          .store
          .replace_document(self.collection, key, body)
          .await
          .map_err(|e| self.failure("update", Some(id), e))
      })
      .await?;

    debug!(collection = self.collection, key = %meta.key, rev = %meta.rev, "document replaced");
    staged.set_metadata(meta);
    *entity = staged;
    Ok(())
  }

  async fn delete(&self, ctx: &OpContext, id: &str) -> Result<()> {
    let key = self.resolve_key(id)?;

    ctx
      .run(async {
        self
          .store
          .remove_document(self.collection, key)
          .await
          .map_err(|e| self.failure("delete", Some(id), e))
      })
      .await?;

    debug!(collection = self.collection, key, "document removed");
    Ok(())
  }

  async fn list(&self, ctx: &OpContext) -> Result<Vec<E>> {
    self.find(ctx, DocumentQuery::scan(self.collection), "list").await
  }
}

/// "Now", nudged forward if the clock has not moved past `previous`.
fn next_timestamp(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
  let now = Utc::now();
  match previous {
    Some(prev) if prev >= now => prev + TimeDelta::microseconds(1),
    _ => now,
  }
}

fn is_key_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || "_-:.@()+,=;$!*'%".contains(c)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn next_timestamp_is_strictly_later() {
    let future = Utc::now() + TimeDelta::seconds(60);
    assert!(next_timestamp(Some(future)) > future);

    let past = Utc::now() - TimeDelta::seconds(60);
    assert!(next_timestamp(Some(past)) > past);
    assert!(next_timestamp(None) <= Utc::now());
  }

  #[test]
  fn key_characters() {
    assert!("abc-123_:.@".chars().all(is_key_char));
    assert!(!is_key_char('/'));
    assert!(!is_key_char(' '));
    assert!(!is_key_char('"'));
  }
}
