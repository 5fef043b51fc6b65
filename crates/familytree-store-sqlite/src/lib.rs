//! SQLite backend for the family tree store.
//!
//! Emulates a document-oriented graph store on a single SQLite file: named
//! collections of JSON documents, edge collections whose documents must
//! carry `_from`/`_to`, and store-assigned keys and revisions. Wraps
//! [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod schema;
mod sql;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
