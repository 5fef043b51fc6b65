//! ArangoDB backend for the family tree store.
//!
//! Talks to the ArangoDB HTTP API with [`reqwest`]: basic authentication,
//! round-robin over the configured endpoints and retry with doubling backoff
//! for transport failures. [`ArangoStore::connect`] resolves (or creates) the
//! target database and provisions the person and relationship collections
//! before handing out a store.

mod aql;
mod store;
mod transport;

pub mod error;
pub mod options;

pub use error::{Error, Result};
pub use options::ArangoOptions;
pub use store::ArangoStore;
