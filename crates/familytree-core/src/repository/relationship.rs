//! [`RelationshipRepository`]: CRUD plus edge lookups over the
//! `relationships` collection.

use std::sync::Arc;

use super::{DocumentRepository, Repository};
use crate::{
  OpContext, Result,
  query::{DocumentQuery, Filter},
  relationship::Relationship,
  store::{DocumentStore, RELATIONSHIPS},
};

pub struct RelationshipRepository<S> {
  documents: DocumentRepository<Relationship, S>,
}

impl<S> Clone for RelationshipRepository<S> {
  fn clone(&self) -> Self { Self { documents: self.documents.clone() } }
}

impl<S: DocumentStore> RelationshipRepository<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { documents: DocumentRepository::new(store, RELATIONSHIPS) }
  }

  /// Every edge with `person_id` at either end. Edges are stored directed but
  /// looked up undirected.
  pub async fn find_by_person(
    &self,
    ctx: &OpContext,
    person_id: &str,
  ) -> Result<Vec<Relationship>> {
    let query = DocumentQuery::scan(RELATIONSHIPS)
      .filter(Filter::eq("_from", "personId").or(Filter::eq("_to", "personId")))
      .bind("personId", person_id);
    self.documents.find(ctx, query, "find_by_person").await
  }

  /// Exact match on the stored type string; unknown types are not rejected
  /// here and simply match whatever was stored.
  pub async fn find_by_type(
    &self,
    ctx: &OpContext,
    relation_type: &str,
  ) -> Result<Vec<Relationship>> {
    let query = DocumentQuery::scan(RELATIONSHIPS)
      .filter(Filter::eq("relationType", "relationType"))
      .bind("relationType", relation_type);
    self.documents.find(ctx, query, "find_by_type").await
  }
}

impl<S: DocumentStore> Repository<Relationship> for RelationshipRepository<S> {
  async fn create(&self, ctx: &OpContext, entity: &mut Relationship) -> Result<()> {
    self.documents.create(ctx, entity).await
  }

  async fn get_by_id(&self, ctx: &OpContext, id: &str) -> Result<Relationship> {
    self.documents.get_by_id(ctx, id).await
  }

  async fn update(
    &self,
    ctx: &OpContext,
    id: &str,
    entity: &mut Relationship,
  ) -> Result<()> {
    self.documents.update(ctx, id, entity).await
  }

  async fn delete(&self, ctx: &OpContext, id: &str) -> Result<()> {
    self.documents.delete(ctx, id).await
  }

  async fn list(&self, ctx: &OpContext) -> Result<Vec<Relationship>> {
    self.documents.list(ctx).await
  }
}
