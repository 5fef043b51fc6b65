//! [`ArangoStore`]: the ArangoDB implementation of [`DocumentStore`].

use std::sync::Arc;

use reqwest::Method;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use familytree_core::{
  DocumentMeta,
  query::DocumentQuery,
  store::{
    CollectionKind, DocumentStore, StoreError, StoredDocument,
    ensure_required_collections, strip_system_attributes,
  },
};

use crate::{
  ArangoOptions, Error, Result, aql,
  error::ERROR_DATABASE_NOT_FOUND,
  transport::Transport,
};

/// Rows fetched per cursor round trip.
const CURSOR_BATCH_SIZE: u32 = 1000;

/// ArangoDB collection type codes.
const TYPE_DOCUMENT: i64 = 2;
const TYPE_EDGE: i64 = 3;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A family tree document store living in one ArangoDB database.
///
/// Cloning is cheap: the HTTP client and settings are reference-counted.
#[derive(Debug, Clone)]
pub struct ArangoStore {
  transport: Arc<Transport>,
  database:  Arc<str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Cursor {
  #[serde(default)]
  result:   Vec<Value>,
  #[serde(default)]
  has_more: bool,
  id:       Option<String>,
}

impl ArangoStore {
  /// Resolve or create the target database and provision the person and
  /// relationship collections.
  pub async fn connect(options: ArangoOptions) -> Result<Self> {
    let store = Self {
      transport: Arc::new(Transport::new(&options)?),
      database:  Arc::from(options.database.as_str()),
    };
    store.ensure_database().await?;
    ensure_required_collections(&store).await?;
    info!(
      database = %store.database,
      endpoints = ?options.endpoints,
      "connected to arangodb"
    );
    Ok(store)
  }

  pub fn database(&self) -> &str { &self.database }

  /// Request `/_db/<database>/_api/<rest...>`.
  async fn call(&self, method: Method, rest: &[&str], body: Option<&Value>) -> Result<Value> {
    let mut segments = vec!["_db", &*self.database, "_api"];
    segments.extend_from_slice(rest);
    self.transport.send(method, &segments, body).await
  }

  async fn ensure_database(&self) -> Result<()> {
    let current = self
      .call(Method::GET, &["database", "current"], None)
      .await;
    match current {
      Ok(_) => return Ok(()),
      Err(e)
        if e.error_num() == Some(ERROR_DATABASE_NOT_FOUND) || e.status() == Some(404) => {}
      Err(e) => return Err(e),
    }

    let body = json!({ "name": &*self.database });
    let created = self
      .transport
      .send(Method::POST, &["_db", "_system", "_api", "database"], Some(&body))
      .await;
    match created {
      Ok(_) => {
        info!(database = %self.database, "database created");
        Ok(())
      }
      Err(e) if e.is_duplicate() => Ok(()),
      Err(e) => Err(e),
    }
  }

  async fn provision(&self, name: &str, kind: CollectionKind) -> Result<()> {
    let expected = match kind {
      CollectionKind::Document => TYPE_DOCUMENT,
      CollectionKind::Edge => TYPE_EDGE,
    };

    match self.call(Method::GET, &["collection", name], None).await {
      Ok(existing) => {
        let actual = existing.get("type").and_then(Value::as_i64);
        if actual != Some(expected) {
          return Err(
            StoreError::Conflict(format!(
              "collection {name} exists with type {actual:?}, expected {kind}"
            ))
            .into(),
          );
        }
        Ok(())
      }
      Err(e) if e.status() == Some(404) => {
        let body = json!({ "name": name, "type": expected });
        match self.call(Method::POST, &["collection"], Some(&body)).await {
          Ok(_) => {
            info!(collection = name, kind = %kind, "collection created");
            Ok(())
          }
          Err(e) if e.is_duplicate() => Ok(()),
          Err(e) => Err(e),
        }
      }
      Err(e) => Err(e),
    }
  }

  async fn insert(&self, collection: &str, mut body: Value) -> Result<DocumentMeta> {
    strip_system_attributes(&mut body);
    let answer = self
      .call(Method::POST, &["document", collection], Some(&body))
      .await?;
    let meta: DocumentMeta = serde_json::from_value(answer)?;
    debug!(collection, key = %meta.key, "document inserted");
    Ok(meta)
  }

  async fn fetch(&self, collection: &str, key: &str) -> Result<StoredDocument> {
    let body = self
      .call(Method::GET, &["document", collection, key], None)
      .await?;
    let meta = DocumentMeta::deserialize(&body)?;
    Ok(StoredDocument { meta, body })
  }

  async fn replace(&self, collection: &str, key: &str, mut body: Value) -> Result<DocumentMeta> {
    strip_system_attributes(&mut body);
    let answer = self
      .call(Method::PUT, &["document", collection, key], Some(&body))
      .await?;
    Ok(serde_json::from_value(answer)?)
  }

  async fn remove(&self, collection: &str, key: &str) -> Result<()> {
    self
      .call(Method::DELETE, &["document", collection, key], None)
      .await?;
    Ok(())
  }

  async fn select(&self, query: &DocumentQuery) -> Result<Vec<Value>> {
    let rendered = aql::render(query)?;
    let body = json!({
      "query": rendered.query,
      "bindVars": rendered.bind_vars,
      "batchSize": CURSOR_BATCH_SIZE,
    });

    let mut cursor: Cursor =
      serde_json::from_value(self.call(Method::POST, &["cursor"], Some(&body)).await?)?;
    let mut rows = std::mem::take(&mut cursor.result);

    while cursor.has_more {
      let Some(id) = cursor.id.take() else {
        return Err(Error::UnexpectedResponse("cursor has more results but no id".into()));
      };
      cursor = serde_json::from_value(
        self.call(Method::POST, &["cursor", &id], None).await?,
      )?;
      rows.append(&mut cursor.result);
    }

    Ok(rows)
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for ArangoStore {
  async fn ping(&self) -> Result<(), StoreError> {
    self
      .transport
      .send(Method::GET, &["_api", "version"], None)
      .await?;
    Ok(())
  }

  async fn ensure_collection(&self, name: &str, kind: CollectionKind) -> Result<(), StoreError> {
    Ok(self.provision(name, kind).await?)
  }

  async fn create_document(&self, collection: &str, body: Value) -> Result<DocumentMeta, StoreError> {
    Ok(self.insert(collection, body).await?)
  }

  async fn read_document(&self, collection: &str, key: &str) -> Result<StoredDocument, StoreError> {
    Ok(self.fetch(collection, key).await?)
  }

  async fn replace_document(
    &self,
    collection: &str,
    key: &str,
    body: Value,
  ) -> Result<DocumentMeta, StoreError> {
    Ok(self.replace(collection, key, body).await?)
  }

  async fn remove_document(&self, collection: &str, key: &str) -> Result<(), StoreError> {
    Ok(self.remove(collection, key).await?)
  }

  async fn query(&self, query: &DocumentQuery) -> Result<Vec<Value>, StoreError> {
    Ok(self.select(query).await?)
  }
}
