//! fleetd — the Fleet rental service binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens an
//! in-process SQLite store, and serves the JSON API over HTTP.
//!
//! The daily reconciliation sweep is triggered externally: point a cron
//! entry either at `fleetd sweep` or at `POST /sweep`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use fleet_core::service::LifecycleService;
use fleet_store_sqlite::SqliteStore;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Fleet rental service")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API (the default when no subcommand is given).
  Serve,
  /// Run the daily reconciliation sweep once, print the report, and exit.
  Sweep {
    /// Evaluation date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
  },
}

/// Runtime configuration, deserialised from `config.toml` and the `FLEET_*`
/// environment.
#[derive(Debug, Clone, Deserialize)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host:            String,
  #[serde(default = "default_port")]
  port:            u16,
  #[serde(default = "default_store_path")]
  store_path:      PathBuf,
  /// Maximum rental span accepted at contract creation, in days.
  #[serde(default = "default_max_rental_days")]
  max_rental_days: i64,
}

fn default_host() -> String {
  "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
  8080
}

fn default_store_path() -> PathBuf {
  PathBuf::from("fleet.db")
}

fn default_max_rental_days() -> i64 {
  fleet_core::validate::DEFAULT_MAX_SPAN_DAYS
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("FLEET"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let service = Arc::new(
    LifecycleService::new(Arc::new(store))
      .with_max_span_days(server_cfg.max_rental_days),
  );

  match cli.command.unwrap_or(Command::Serve) {
    Command::Sweep { date } => {
      let today = date.unwrap_or_else(|| Utc::now().date_naive());
      let report = service
        .run_daily_sweep(today)
        .await
        .context("daily sweep failed")?;
      println!("{}", serde_json::to_string_pretty(&report)?);
      Ok(())
    }
    Command::Serve => {
      let app = fleet_api::api_router(service)
        .layer(TraceLayer::new_for_http());
      let address = format!("{}:{}", server_cfg.host, server_cfg.port);

      tracing::info!("Listening on http://{address}");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

      axum::serve(listener, app).await.context("server error")?;
      Ok(())
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
