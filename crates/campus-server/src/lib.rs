//! HTTP surface for Campus identity & role resolution.
//!
//! Exposes an axum [`Router`] whose access-controlled routes resolve the
//! caller through [`campus_core::RoleResolver`] on every request.

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use campus_core::RoleResolver;
use campus_store_sqlite::{PrivilegedRoleReader, SqliteStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{handles, me};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CAMPUS_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:           String,
  #[serde(default = "default_port")]
  pub port:           u16,
  pub store_path:     PathBuf,
  /// Name of the cookie carrying the session token.
  #[serde(default = "default_session_cookie")]
  pub session_cookie: String,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_session_cookie() -> String { "campus_session".to_string() }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
///
/// Built once at startup. `store` offers sessions and administrative reads
/// only; role records are reachable solely through `resolver`.
#[derive(Clone)]
pub struct AppState {
  pub store:    Arc<SqliteStore>,
  pub resolver: RoleResolver<PrivilegedRoleReader>,
  pub config:   Arc<ServerConfig>,
}

impl AppState {
  pub fn new(store: SqliteStore, config: ServerConfig) -> Self {
    let resolver = store.role_resolver();
    Self {
      store: Arc::new(store),
      resolver,
      config: Arc::new(config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the server.
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/me",               get(me::current))
    .route("/me/elevated",      get(me::elevated))
    .route("/handles/{handle}", get(handles::canonical))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
pub(crate) fn test_config() -> ServerConfig {
  ServerConfig {
    host:           default_host(),
    port:           default_port(),
    store_path:     PathBuf::from(":memory:"),
    session_cookie: default_session_cookie(),
  }
}
