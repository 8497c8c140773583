use axum::extract::State;
use axum::{routing::get, Json, Router};
use plugdash_core::types::Timestamp;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` once a dashboard is available, `warming` before the first refresh.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub site_name: String,
    pub last_refreshed_at: Option<Timestamp>,
    pub plugin_count: usize,
}

/// GET /health -- returns service status and refresh progress.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.store.current().await;

    Json(HealthResponse {
        status: if snapshot.is_some() { "ok" } else { "warming" },
        version: env!("CARGO_PKG_VERSION"),
        site_name: state.config.site_name.clone(),
        last_refreshed_at: snapshot.as_ref().map(|s| s.refreshed_at),
        plugin_count: snapshot.map_or(0, |s| s.dashboard.plugins.len()),
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
