//! `campus` server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite identity store, and serves the role-resolution API over HTTP.
//!
//! # Assigning roles
//!
//! Role records are written out-of-band. To make `principal` an admin:
//!
//! ```
//! cargo run -p campus-server --bin campus -- grant principal admin
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use campus_core::{Handle, Role, store::IdentityStore};
use campus_server::{AppState, ServerConfig};
use campus_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Campus identity & role server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Create the subject for a login handle if needed and set its role.
  Grant {
    /// Login handle, e.g. `principal`.
    handle: String,
    /// One of owner, admin, teacher, class_supervisor, student, parent,
    /// accountant.
    role:   String,
  },
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

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CAMPUS"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(store, server_cfg).await,
    Command::Grant { handle, role } => grant(&store, &handle, &role).await,
  }
}

async fn serve(store: SqliteStore, server_cfg: ServerConfig) -> anyhow::Result<()> {
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let app = campus_server::router(AppState::new(store, server_cfg));

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn grant(store: &SqliteStore, raw_handle: &str, raw_role: &str) -> anyhow::Result<()> {
  let handle = Handle::parse(raw_handle)?;
  let role: Role = raw_role.parse()?;
  let canonical_id = handle.canonical();

  let subject = match store.find_subject(&canonical_id).await? {
    Some(subject) => subject,
    None => store.add_subject(canonical_id).await?,
  };

  let record = store.assign_role(subject.subject_id, role).await?;
  println!("{handle} ({}) is now {}", record.subject_id, record.role);
  Ok(())
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
