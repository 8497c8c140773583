//! Handlers for the plugin dashboard.
//!
//! Both endpoints read the latest snapshot; nothing here talks to the
//! upstream API.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use plugdash_core::slack::ScoredPlugin;
use plugdash_core::types::Timestamp;
use plugdash_pipeline::dashboard::Dashboard;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::snapshot::Snapshot;
use crate::state::AppState;

/// Dashboard payload with the serving context around it.
#[derive(Debug, Serialize)]
pub struct DashboardView<'a> {
    pub site_name: &'a str,
    pub refreshed_at: Timestamp,
    #[serde(flatten)]
    pub dashboard: &'a Dashboard,
}

async fn require_snapshot(state: &AppState) -> AppResult<Snapshot> {
    state.store.current().await.ok_or(AppError::NotReady)
}

/// GET /api/v1/dashboard
pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Response> {
    let snapshot = require_snapshot(&state).await?;

    let data = DashboardView {
        site_name: &state.config.site_name,
        refreshed_at: snapshot.refreshed_at,
        dashboard: &snapshot.dashboard,
    };

    Ok(Json(DataResponse { data }).into_response())
}

/// GET /api/v1/dashboard/plugins/{slug}
pub async fn get_plugin(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<ScoredPlugin>>> {
    let snapshot = require_snapshot(&state).await?;

    let plugin = snapshot
        .dashboard
        .plugin(&slug)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Plugin '{slug}'")))?;

    Ok(Json(DataResponse { data: plugin }))
}
