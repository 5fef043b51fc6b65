//! Connection settings for [`ArangoStore`](crate::ArangoStore).

use std::{fmt, time::Duration};

/// Where and how to reach ArangoDB.
///
/// Start from [`ArangoOptions::default`] and override one field at a time:
///
/// ```
/// use std::time::Duration;
/// use familytree_store_arango::ArangoOptions;
///
/// let options = ArangoOptions::default()
///   .with_endpoints(["http://db-1:8529", "http://db-2:8529"])
///   .with_password("secret")
///   .with_max_retries(5)
///   .with_retry_delay(Duration::from_millis(250));
/// assert_eq!(options.database, "familytree");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ArangoOptions {
  /// Base URLs, used round-robin.
  pub endpoints:   Vec<String>,
  pub username:    String,
  pub password:    String,
  pub database:    String,
  /// Per-request timeout.
  pub timeout:     Duration,
  /// Extra attempts after the first one for retryable failures.
  pub max_retries: u32,
  /// Wait before the first retry; doubled after each one.
  pub retry_delay: Duration,
}

impl Default for ArangoOptions {
  fn default() -> Self {
    Self {
      endpoints:   vec!["http://localhost:8529".to_owned()],
      username:    "root".to_owned(),
      password:    String::new(),
      database:    "familytree".to_owned(),
      timeout:     Duration::from_secs(30),
      max_retries: 3,
      retry_delay: Duration::from_secs(1),
    }
  }
}

impl ArangoOptions {
  pub fn with_endpoints<I, E>(mut self, endpoints: I) -> Self
  where
    I: IntoIterator<Item = E>,
    E: Into<String>,
  {
    self.endpoints = endpoints.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_username(mut self, username: impl Into<String>) -> Self {
    self.username = username.into();
    self
  }

  pub fn with_password(mut self, password: impl Into<String>) -> Self {
    self.password = password.into();
    self
  }

  pub fn with_database(mut self, database: impl Into<String>) -> Self {
    self.database = database.into();
    self
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn with_max_retries(mut self, max_retries: u32) -> Self {
    self.max_retries = max_retries;
    self
  }

  pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
    self.retry_delay = retry_delay;
    self
  }
}

impl fmt::Debug for ArangoOptions {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ArangoOptions")
      .field("endpoints", &self.endpoints)
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .field("database", &self.database)
      .field("timeout", &self.timeout)
      .field("max_retries", &self.max_retries)
      .field("retry_delay", &self.retry_delay)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let o = ArangoOptions::default();
    assert_eq!(o.endpoints, vec!["http://localhost:8529"]);
    assert_eq!(o.username, "root");
    assert_eq!(o.password, "");
    assert_eq!(o.database, "familytree");
    assert_eq!(o.timeout, Duration::from_secs(30));
    assert_eq!(o.max_retries, 3);
    assert_eq!(o.retry_delay, Duration::from_secs(1));
  }

  #[test]
  fn builders_override_one_field() {
    let o = ArangoOptions::default().with_database("genealogy");
    assert_eq!(o.database, "genealogy");
    assert_eq!(o.username, "root");
    assert_eq!(o.max_retries, 3);
  }

  #[test]
  fn debug_hides_password() {
    let o = ArangoOptions::default().with_password("hunter2");
    let shown = format!("{o:?}");
    assert!(!shown.contains("hunter2"));
    assert!(shown.contains("<redacted>"));
  }
}
