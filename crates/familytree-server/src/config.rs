//! Server configuration: an optional TOML file layered under `FAMILYTREE_*`
//! environment variables.
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//! request_timeout_secs = 30
//!
//! [store]
//! backend = "arango"
//! endpoints = ["http://arango-1:8529", "http://arango-2:8529"]
//! password = "secret"
//! ```
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `FAMILYTREE_STORE__BACKEND=sqlite` and `FAMILYTREE_STORE__PATH=/data/tree.db`.
//! `FAMILYTREE_STORE__ENDPOINTS` takes a comma-separated list.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use familytree_store_arango::ArangoOptions;
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  #[serde(default = "default_request_timeout_secs")]
  pub request_timeout_secs: u64,
  #[serde(default)]
  pub store:                StoreConfig,
}

/// Which backend to open, selected by `backend`.
#[derive(Deserialize, Clone)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
  Sqlite {
    #[serde(default = "default_sqlite_path")]
    path: PathBuf,
  },
  Arango(ArangoConfig),
}

impl Default for StoreConfig {
  fn default() -> Self { Self::Sqlite { path: default_sqlite_path() } }
}

/// Every field is optional; unset ones keep the [`ArangoOptions`] default.
#[derive(Deserialize, Clone, Default)]
pub struct ArangoConfig {
  pub endpoints:      Option<Vec<String>>,
  pub username:       Option<String>,
  pub password:       Option<String>,
  pub database:       Option<String>,
  pub timeout_secs:   Option<u64>,
  pub max_retries:    Option<u32>,
  pub retry_delay_ms: Option<u64>,
}

impl ArangoConfig {
  pub fn to_options(&self) -> ArangoOptions {
    let mut options = ArangoOptions::default();
    if let Some(endpoints) = &self.endpoints {
      options = options.with_endpoints(endpoints.iter().cloned());
    }
    if let Some(username) = &self.username {
      options = options.with_username(username.clone());
    }
    if let Some(password) = &self.password {
      options = options.with_password(password.clone());
    }
    if let Some(database) = &self.database {
      options = options.with_database(database.clone());
    }
    if let Some(secs) = self.timeout_secs {
      options = options.with_timeout(Duration::from_secs(secs));
    }
    if let Some(retries) = self.max_retries {
      options = options.with_max_retries(retries);
    }
    if let Some(ms) = self.retry_delay_ms {
      options = options.with_retry_delay(Duration::from_millis(ms));
    }
    options
  }
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_request_timeout_secs() -> u64 { 30 }

fn default_sqlite_path() -> PathBuf { PathBuf::from("familytree.db") }

/// Read `path` (if it exists) and the environment.
pub fn load(path: &Path) -> Result<ServerConfig, ConfigError> {
  build(Config::builder().add_source(File::from(path).required(false)))
}

fn build(builder: ConfigBuilder<DefaultState>) -> Result<ServerConfig, ConfigError> {
  builder
    .add_source(
      Environment::with_prefix("FAMILYTREE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("store.endpoints"),
    )
    .build()?
    .try_deserialize()
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use config::FileFormat;

  use super::*;

  fn parse(toml: &str) -> ServerConfig {
    build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml))).unwrap()
  }

  #[test]
  fn empty_file_selects_sqlite_defaults() {
    let cfg = parse("");
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.request_timeout_secs, 30);
    assert!(matches!(cfg.store, StoreConfig::Sqlite { ref path } if path == Path::new("familytree.db")));
  }

  #[test]
  fn arango_fields_override_defaults_one_at_a_time() {
    let cfg = parse(
      r#"
        port = 9000

        [store]
        backend = "arango"
        endpoints = ["http://db:8529"]
        retry_delay_ms = 250
      "#,
    );
    assert_eq!(cfg.port, 9000);
    let StoreConfig::Arango(arango) = cfg.store else {
      panic!("expected arango backend");
    };
    let options = arango.to_options();
    assert_eq!(options.endpoints, vec!["http://db:8529"]);
    assert_eq!(options.retry_delay, Duration::from_millis(250));
    assert_eq!(options.username, "root");
    assert_eq!(options.database, "familytree");
    assert_eq!(options.max_retries, 3);
  }

  #[test]
  fn tilde_expands_to_home() {
    let plain = Path::new("/var/lib/tree.db");
    assert_eq!(expand_tilde(plain), plain);
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expand_tilde(Path::new("~/tree.db")), Path::new(&home).join("tree.db"));
    }
  }
}
