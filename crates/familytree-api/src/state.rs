//! [`AppState`]: the handles every request handler shares.

use std::{sync::Arc, time::Duration};

use familytree_core::{
  OpContext,
  service::{PersonService, RelationshipService},
  store::DocumentStore,
};

/// Built once at start-up and cloned into every handler.
pub struct AppState<S> {
  pub store:           Arc<S>,
  pub persons:         Arc<PersonService<S>>,
  pub relationships:   Arc<RelationshipService<S>>,
  /// Deadline applied to the store work of each request.
  pub request_timeout: Duration,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:           Arc::clone(&self.store),
      persons:         Arc::clone(&self.persons),
      relationships:   Arc::clone(&self.relationships),
      request_timeout: self.request_timeout,
    }
  }
}

impl<S: DocumentStore> AppState<S> {
  pub fn new(store: Arc<S>, request_timeout: Duration) -> Self {
    Self {
      persons: Arc::new(PersonService::from_store(Arc::clone(&store))),
      relationships: Arc::new(RelationshipService::from_store(Arc::clone(&store))),
      store,
      request_timeout,
    }
  }

  /// A fresh context for one request.
  pub fn context(&self) -> OpContext { OpContext::with_timeout(self.request_timeout) }
}
