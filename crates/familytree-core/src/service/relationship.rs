use std::sync::Arc;

use tracing::{info, instrument};

use super::require_id;
use crate::{
  Error, OpContext, Result,
  relationship::{Relationship, RelationshipCreateRequest, RelationshipUpdateRequest},
  repository::{RelationshipRepository, Repository},
  store::DocumentStore,
};

pub struct RelationshipService<S> {
  repo: RelationshipRepository<S>,
}

impl<S: DocumentStore> RelationshipService<S> {
  pub fn new(repo: RelationshipRepository<S>) -> Self { Self { repo } }

  pub fn from_store(store: Arc<S>) -> Self {
    Self::new(RelationshipRepository::new(store))
  }

  /// The endpoints are not checked against the `persons` collection.
  #[instrument(skip(self, ctx, req))]
  pub async fn create_relationship(
    &self,
    ctx: &OpContext,
    req: RelationshipCreateRequest,
  ) -> Result<Relationship> {
    req.validate()?;
    let mut relationship = req.into_relationship();
    self.repo.create(ctx, &mut relationship).await?;
    info!(
      id = relationship.id.as_deref().unwrap_or_default(),
      from = %relationship.from,
      to = %relationship.to,
      relation_type = %relationship.relation_type,
      "relationship created"
    );
    Ok(relationship)
  }

  #[instrument(skip(self, ctx))]
  pub async fn get_relationship(&self, ctx: &OpContext, id: &str) -> Result<Relationship> {
    let id = require_id(id, "relationship")?;
    self.repo.get_by_id(ctx, id).await
  }

  /// Fetch, apply the non-blank fields of `req`, then replace. The merged
  /// edge must still join two different persons.
  #[instrument(skip(self, ctx, req))]
  pub async fn update_relationship(
    &self,
    ctx: &OpContext,
    id: &str,
    req: RelationshipUpdateRequest,
  ) -> Result<Relationship> {
    let id = require_id(id, "relationship")?;
    req.validate()?;
    let mut relationship = self.repo.get_by_id(ctx, id).await?;
    req.apply_to(&mut relationship)?;
    self.repo.update(ctx, id, &mut relationship).await?;
    Ok(relationship)
  }

  #[instrument(skip(self, ctx))]
  pub async fn delete_relationship(&self, ctx: &OpContext, id: &str) -> Result<()> {
    let id = require_id(id, "relationship")?;
    self.repo.delete(ctx, id).await?;
    info!(id, "relationship deleted");
    Ok(())
  }

  #[instrument(skip(self, ctx))]
  pub async fn list_relationships(&self, ctx: &OpContext) -> Result<Vec<Relationship>> {
    self.repo.list(ctx).await
  }

  #[instrument(skip(self, ctx))]
  pub async fn relationships_for_person(
    &self,
    ctx: &OpContext,
    person_id: &str,
  ) -> Result<Vec<Relationship>> {
    let person_id = require_id(person_id, "person")?;
    self.repo.find_by_person(ctx, person_id).await
  }

  #[instrument(skip(self, ctx))]
  pub async fn relationships_by_type(
    &self,
    ctx: &OpContext,
    relation_type: &str,
  ) -> Result<Vec<Relationship>> {
    let relation_type = relation_type.trim();
    if relation_type.is_empty() {
      return Err(Error::validation("relationship type is required"));
    }
    self.repo.find_by_type(ctx, relation_type).await
  }
}
