//! familytree-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! configured store (embedded SQLite or ArangoDB), and serves the JSON API
//! over HTTP until Ctrl-C.

mod config;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use clap::Parser;
use familytree_api::AppState;
use familytree_core::store::DocumentStore;
use familytree_store_arango::ArangoStore;
use familytree_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{ServerConfig, StoreConfig, expand_tilde};

#[derive(Parser)]
#[command(author, version, about = "Family tree API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = config::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  match &server_cfg.store {
    StoreConfig::Sqlite { path } => {
      let path = expand_tilde(path);
      let store = SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      info!(?path, "opened sqlite store");
      serve(store, &server_cfg).await
    }
    StoreConfig::Arango(arango) => {
      let store = ArangoStore::connect(arango.to_options())
        .await
        .context("failed to connect to arangodb")?;
      serve(store, &server_cfg).await
    }
  }
}

async fn serve<S>(store: S, server_cfg: &ServerConfig) -> anyhow::Result<()>
where
  S: DocumentStore + 'static,
{
  store.ping().await.context("store did not answer ping")?;

  let state = AppState::new(
    Arc::new(store),
    Duration::from_secs(server_cfg.request_timeout_secs),
  );
  let app = familytree_api::api_router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  info!("server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(error = %e, "cannot listen for ctrl-c; shutdown only by termination");
    std::future::pending::<()>().await;
  }
  info!("shutdown requested");
}
