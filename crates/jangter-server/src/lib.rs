//! HTTP server for the jangter merchant directory.
//!
//! Mounts the public JSON API under `/api` and the Basic-auth-guarded
//! administrative surface under `/admin`, backed by any
//! [`DirectoryStore`].

pub mod admin;
pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use jangter_core::{quorum::QuorumPolicy, store::DirectoryStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_confirm_threshold() -> u32 {
  jangter_core::quorum::DEFAULT_CONFIRM_THRESHOLD
}

/// Runtime server configuration, deserialised from `config.toml` (with
/// `JANGTER_*` environment overrides).
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  pub admin_username:      String,
  /// PHC string produced by argon2; see the `--hash-password` helper.
  pub admin_password_hash: String,
  /// Distinct confirmations required to auto-promote a submission. One
  /// value feeds both the evaluator and the progress display.
  #[serde(default = "default_confirm_threshold")]
  pub confirm_threshold:   u32,
}

impl ServerConfig {
  pub fn quorum(&self) -> QuorumPolicy {
    QuorumPolicy::new(self.confirm_threshold)
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all server handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub auth:   Arc<AuthConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  self.store.clone(),
      config: self.config.clone(),
      auth:   self.auth.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete server router: public API, admin surface, request
/// tracing.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: DirectoryStore + Send + Sync + 'static,
  S::Error: Into<jangter_core::Error>,
{
  let quorum = state.config.quorum();
  Router::new()
    .nest("/api", jangter_api::api_router(state.store.clone(), quorum))
    .nest("/admin", admin::admin_router(state))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
