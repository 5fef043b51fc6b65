//! Services: validation and update whitelisting in front of the repositories.
//!
//! Validation failures are raised here, before any store call. Store
//! failures pass through unchanged so callers can still tell `NotFound`
//! apart from `Persistence`.

mod person;
mod relationship;

pub use person::PersonService;
pub use relationship::RelationshipService;

use crate::{Error, Result};

/// Reject a blank id before it reaches a repository.
fn require_id<'a>(id: &'a str, what: &str) -> Result<&'a str> {
  let id = id.trim();
  if id.is_empty() {
    return Err(Error::validation(format!("{what} ID is required")));
  }
  Ok(id)
}
