//! Server assembly for docket.
//!
//! Holds the runtime configuration shape and builds the full HTTP router:
//! the JSON API nested under `/api`, wrapped in request tracing.

use std::path::PathBuf;

use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use docket_api::ApiState;
use docket_core::store::TicketStore;
use docket_engine::Notifier;
use docket_notify::NotifyConfig;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` with
/// `DOCKET_*` environment overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// Outbound notification channel; omitted section = no notifications.
  #[serde(default)]
  pub notify:     NotifyConfig,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the complete application router for `state`.
pub fn router<S, N>(state: ApiState<S, N>) -> Router
where
  S: TicketStore + 'static,
  N: Notifier,
{
  Router::new()
    .nest("/api", docket_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
