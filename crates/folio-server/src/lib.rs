//! HTTP server assembly for Folio.
//!
//! Mounts [`folio_api::api_router`] under `/api`, adds a health probe and a
//! request trace layer. The binary in `main.rs` supplies configuration and
//! the store.

use std::{path::PathBuf, sync::Arc};

use axum::{Json, Router, routing::get};
use folio_core::store::ScopedResumeStore;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `folio.toml` and `FOLIO_*`
/// environment variables. Every field is optional.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       5232,
      store_path: PathBuf::from("~/.local/share/folio/folio.db"),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the top-level router for `store`.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: ScopedResumeStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", folio_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

// ─── Integration tests ────────────────────────────────────────────────────────
