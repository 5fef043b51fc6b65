use std::sync::Arc;

use tracing::{info, instrument};

use super::require_id;
use crate::{
  OpContext, Result,
  person::{Person, PersonCreateRequest, PersonUpdateRequest},
  repository::{PersonRepository, Repository},
  store::DocumentStore,
};

pub struct PersonService<S> {
  repo: PersonRepository<S>,
}

impl<S: DocumentStore> PersonService<S> {
  pub fn new(repo: PersonRepository<S>) -> Self { Self { repo } }

  pub fn from_store(store: Arc<S>) -> Self { Self::new(PersonRepository::new(store)) }

  #[instrument(skip(self, ctx, req))]
  pub async fn create_person(
    &self,
    ctx: &OpContext,
    req: PersonCreateRequest,
  ) -> Result<Person> {
    req.validate()?;
    let mut person = req.into_person();
    self.repo.create(ctx, &mut person).await?;
    info!(id = person.id.as_deref().unwrap_or_default(), "person created");
    Ok(person)
  }

  #[instrument(skip(self, ctx))]
  pub async fn get_person(&self, ctx: &OpContext, id: &str) -> Result<Person> {
    let id = require_id(id, "person")?;
    self.repo.get_by_id(ctx, id).await
  }

  /// Fetch, apply the non-blank fields of `req`, then replace.
  #[instrument(skip(self, ctx, req))]
  pub async fn update_person(
    &self,
    ctx: &OpContext,
    id: &str,
    req: PersonUpdateRequest,
  ) -> Result<Person> {
    let id = require_id(id, "person")?;
    req.validate()?;
    let mut person = self.repo.get_by_id(ctx, id).await?;
    req.apply_to(&mut person);
    self.repo.update(ctx, id, &mut person).await?;
    Ok(person)
  }

  /// Relationships pointing at the person are left in place.
  #[instrument(skip(self, ctx))]
  pub async fn delete_person(&self, ctx: &OpContext, id: &str) -> Result<()> {
    let id = require_id(id, "person")?;
    self.repo.delete(ctx, id).await?;
    info!(id, "person deleted");
    Ok(())
  }

  #[instrument(skip(self, ctx))]
  pub async fn list_persons(&self, ctx: &OpContext) -> Result<Vec<Person>> {
    self.repo.list(ctx).await
  }

  #[instrument(skip(self, ctx))]
  pub async fn search_persons_by_name(
    &self,
    ctx: &OpContext,
    first_name: &str,
    last_name: &str,
  ) -> Result<Vec<Person>> {
    self
      .repo
      .find_by_name(ctx, first_name.trim(), last_name.trim())
      .await
  }
}
