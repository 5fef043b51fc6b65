//! [`SqliteStore`]: the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use familytree_core::{
  DocumentMeta,
  query::DocumentQuery,
  store::{
    CollectionKind, DocumentStore, StoreError, StoredDocument, check_edge,
    ensure_required_collections, strip_system_attributes,
  },
};

use crate::{Result, schema::SCHEMA, sql};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A family tree document store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, run schema initialisation and
  /// provision the person and relationship collections.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let store = Self { conn };
    store.init_schema().await?;
    ensure_required_collections(&store).await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn collection_kind(&self, name: &str) -> Result<Option<CollectionKind>> {
    let name_str = name.to_owned();

    let kind: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT kind FROM collections WHERE name = ?1",
            rusqlite::params![name_str],
            |r| r.get(0),
          )
          .optional()?)
      })
      .await?;

    Ok(kind.map(|k| decode_kind(&k)))
  }

  /// The kind of an existing collection, or `UnknownCollection`.
  async fn existing_collection(&self, name: &str) -> Result<CollectionKind> {
    self
      .collection_kind(name)
      .await?
      .ok_or_else(|| StoreError::UnknownCollection(name.to_owned()).into())
  }

  /// Strip identity, then enforce the collection's document shape.
  async fn prepare_body(&self, collection: &str, mut body: Value) -> Result<String> {
    let kind = self.existing_collection(collection).await?;
    strip_system_attributes(&mut body);
    if !body.is_object() {
      return Err(StoreError::Rejected("document body must be a JSON object".into()).into());
    }
    if kind == CollectionKind::Edge {
      check_edge(&body)?;
    }
    Ok(serde_json::to_string(&body)?)
  }

  async fn insert(&self, collection: &str, body: Value) -> Result<DocumentMeta> {
    let body_str = self.prepare_body(collection, body).await?;
    let meta = document_meta(collection, new_key(), new_rev());

    let coll_str = collection.to_owned();
    let key_str  = meta.key.clone();
    let rev_str  = meta.rev.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (collection, doc_key, rev, body) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![coll_str, key_str, rev_str, body_str],
        )?;
        Ok(())
      })
      .await?;

    debug!(collection, key = %meta.key, "document inserted");
    Ok(meta)
  }

  async fn fetch(&self, collection: &str, key: &str) -> Result<StoredDocument> {
    self.existing_collection(collection).await?;

    let coll_str = collection.to_owned();
    let key_str  = key.to_owned();

    let row: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT rev, body FROM documents WHERE collection = ?1 AND doc_key = ?2",
            rusqlite::params![coll_str, key_str],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?)
      })
      .await?;

    let (rev, body) = row.ok_or(StoreError::NotFound)?;
    let meta = document_meta(collection, key.to_owned(), rev);
    let body = with_identity(serde_json::from_str(&body)?, &meta);
    Ok(StoredDocument { meta, body })
  }

  async fn replace(&self, collection: &str, key: &str, body: Value) -> Result<DocumentMeta> {
    let body_str = self.prepare_body(collection, body).await?;
    let meta = document_meta(collection, key.to_owned(), new_rev());

    let coll_str = collection.to_owned();
    let key_str  = key.to_owned();
    let rev_str  = meta.rev.clone();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE documents SET rev = ?1, body = ?2 WHERE collection = ?3 AND doc_key = ?4",
          rusqlite::params![rev_str, body_str, coll_str, key_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(StoreError::NotFound.into());
    }
    Ok(meta)
  }

  async fn remove(&self, collection: &str, key: &str) -> Result<()> {
    self.existing_collection(collection).await?;

    let coll_str = collection.to_owned();
    let key_str  = key.to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM documents WHERE collection = ?1 AND doc_key = ?2",
          rusqlite::params![coll_str, key_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(StoreError::NotFound.into());
    }
    Ok(())
  }

  async fn select(&self, query: &DocumentQuery) -> Result<Vec<Value>> {
    let rendered = sql::render(query)?;
    self.existing_collection(query.collection()).await?;

    let collection = query.collection();
    let rows: Vec<(String, String, String)> = self
      .conn
      .call(move |conn| {
        let named: Vec<(&str, &dyn rusqlite::ToSql)> = rendered
          .params
          .iter()
          .map(|(name, value)| (name.as_str(), value as &dyn rusqlite::ToSql))
          .collect();
        let mut stmt = conn.prepare(&rendered.sql)?;
        let rows = stmt
          .query_map(named.as_slice(), |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(key, rev, body)| {
        let meta = document_meta(collection, key, rev);
        Ok(with_identity(serde_json::from_str(&body)?, &meta))
      })
      .collect()
  }

  async fn provision(&self, name: &str, kind: CollectionKind) -> Result<()> {
    let name_str = name.to_owned();
    let kind_str = kind.as_ref().to_owned();

    let (inserted, existing): (usize, String) = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO collections (name, kind) VALUES (?1, ?2)
           ON CONFLICT(name) DO NOTHING",
          rusqlite::params![name_str, kind_str],
        )?;
        let existing: String = conn.query_row(
          "SELECT kind FROM collections WHERE name = ?1",
          rusqlite::params![name_str],
          |r| r.get(0),
        )?;
        Ok((inserted, existing))
      })
      .await?;

    if existing != kind.as_ref() {
      return Err(
        StoreError::Conflict(format!(
          "collection {name} already exists as a {existing} collection"
        ))
        .into(),
      );
    }
    if inserted > 0 {
      info!(collection = name, kind = %kind, "collection created");
    }
    Ok(())
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  async fn ping(&self) -> Result<(), StoreError> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))?;
        Ok(())
      })
      .await
      .map_err(StoreError::backend)
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

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn new_key() -> String { Uuid::new_v4().simple().to_string() }

fn new_rev() -> String { Uuid::new_v4().simple().to_string() }

fn document_meta(collection: &str, key: String, rev: String) -> DocumentMeta {
  DocumentMeta { id: format!("{collection}/{key}"), key, rev }
}

fn decode_kind(kind: &str) -> CollectionKind {
  if kind == CollectionKind::Edge.as_ref() {
    CollectionKind::Edge
  } else {
    CollectionKind::Document
  }
}

/// Put the identity triple back into a stored body.
fn with_identity(mut body: Value, meta: &DocumentMeta) -> Value {
  if let Value::Object(map) = &mut body {
    map.insert("_key".into(), Value::String(meta.key.clone()));
    map.insert("_id".into(), Value::String(meta.id.clone()));
    map.insert("_rev".into(), Value::String(meta.rev.clone()));
  }
  body
}
