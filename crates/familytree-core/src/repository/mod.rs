//! Repositories: the mapping between entities and store documents.
//!
//! [`DocumentRepository`] implements CRUD for any [`Entity`]; the person and
//! relationship repositories wrap it and add their lookup queries.

mod document;
mod person;
mod relationship;

use std::future::Future;

pub use document::DocumentRepository;
pub use person::PersonRepository;
pub use relationship::RelationshipRepository;

use crate::{Entity, OpContext, Result};

/// The CRUD boundary shared by every entity repository.
///
/// `id` is either a bare document key or a full `<collection>/<key>` id.
pub trait Repository<E: Entity>: Send + Sync {
  /// Persist a transient entity. On success `entity` carries the identity
  /// the store assigned and `created_at == updated_at`; on failure it is
  /// left untouched.
  fn create<'a>(
    &'a self,
    ctx: &'a OpContext,
    entity: &'a mut E,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  fn get_by_id<'a>(
    &'a self,
    ctx: &'a OpContext,
    id: &'a str,
  ) -> impl Future<Output = Result<E>> + Send + 'a;

  /// Replace the stored document with `entity`, keeping its `created_at` and
  /// advancing `updated_at`. Refreshes the identity (new revision) on success.
  fn update<'a>(
    &'a self,
    ctx: &'a OpContext,
    id: &'a str,
    entity: &'a mut E,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  fn delete<'a>(
    &'a self,
    ctx: &'a OpContext,
    id: &'a str,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// Every document in the collection, unordered and unpaginated.
  fn list<'a>(
    &'a self,
    ctx: &'a OpContext,
  ) -> impl Future<Output = Result<Vec<E>>> + Send + 'a;
}
