//! [`PersonRepository`]: CRUD plus name lookup over the `persons` collection.

use std::sync::Arc;

use super::{DocumentRepository, Repository};
use crate::{
  OpContext, Result,
  person::Person,
  query::{DocumentQuery, Filter},
  store::{DocumentStore, PERSONS},
};

pub struct PersonRepository<S> {
  documents: DocumentRepository<Person, S>,
}

impl<S> Clone for PersonRepository<S> {
  fn clone(&self) -> Self { Self { documents: self.documents.clone() } }
}

impl<S: DocumentStore> PersonRepository<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { documents: DocumentRepository::new(store, PERSONS) }
  }

  /// Persons whose first and last name match exactly. An empty filter value
  /// matches every name, so `("", "")` returns the whole collection.
  pub async fn find_by_name(
    &self,
    ctx: &OpContext,
    first_name: &str,
    last_name: &str,
  ) -> Result<Vec<Person>> {
    let query = DocumentQuery::scan(PERSONS)
      .filter(Filter::eq_unless_empty("firstName", "firstName"))
      .filter(Filter::eq_unless_empty("lastName", "lastName"))
      .bind("firstName", first_name)
      .bind("lastName", last_name);
    self.documents.find(ctx, query, "find_by_name").await
  }
}

impl<S: DocumentStore> Repository<Person> for PersonRepository<S> {
  async fn create(&self, ctx: &OpContext, entity: &mut Person) -> Result<()> {
    self.documents.create(ctx, entity).await
  }

  async fn get_by_id(&self, ctx: &OpContext, id: &str) -> Result<Person> {
    self.documents.get_by_id(ctx, id).await
  }

  async fn update(&self, ctx: &OpContext, id: &str, entity: &mut Person) -> Result<()> {
    self.documents.update(ctx, id, entity).await
  }

  async fn delete(&self, ctx: &OpContext, id: &str) -> Result<()> {
    self.documents.delete(ctx, id).await
  }

  async fn list(&self, ctx: &OpContext) -> Result<Vec<Person>> {
    self.documents.list(ctx).await
  }
}
