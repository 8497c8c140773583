//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use plugdash_api::config::ServerConfig;
use plugdash_api::router::build_app_router;
use plugdash_api::snapshot::SnapshotStore;
use plugdash_api::state::AppState;
use plugdash_core::metadata::PluginMetadata;
use plugdash_core::types::{RawSeries, Timestamp};
use plugdash_pipeline::assembler::assemble;
use plugdash_pipeline::config::DashboardConfig;
use plugdash_pipeline::dashboard::Dashboard;
use plugdash_wporg::source::PluginSource;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults and the given plugin list.
pub fn test_config(plugins: &str) -> ServerConfig {
    ServerConfig::from_lookup(|var| match var {
        "HOST" => Some("127.0.0.1".into()),
        "PORT" => Some("0".into()),
        "SITE_NAME" => Some("Test Plugins".into()),
        "PLUGINS" => Some(plugins.into()),
        _ => None,
    })
    .expect("test configuration is valid")
}

/// Build the full application router over the given store.
pub fn build_test_app(store: Arc<SnapshotStore>) -> Router {
    let config = test_config("");
    let state = AppState {
        config: Arc::new(config.clone()),
        store,
    };
    build_app_router(state, &config)
}

/// Send a GET request through the router.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// In-memory upstream
// ---------------------------------------------------------------------------

/// Serves canned plugin payloads; slugs without one fail metadata fetches.
#[derive(Default)]
pub struct FakeSource {
    pub platform_version: Option<String>,
    pub metadata: HashMap<String, Value>,
    pub downloads: HashMap<String, Value>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            platform_version: Some("6.5".into()),
            ..Default::default()
        }
    }

    pub fn with_plugin(mut self, slug: &str, metadata: Value) -> Self {
        self.metadata.insert(slug.into(), metadata);
        self
    }
}

#[async_trait]
impl PluginSource for FakeSource {
    async fn fetch_plugin_info(&self, slug: &str) -> Option<PluginMetadata> {
        self.metadata
            .get(slug)
            .map(|v| serde_json::from_value(v.clone()).unwrap())
    }

    async fn fetch_downloads_stats(&self, slug: &str) -> Option<RawSeries> {
        self.downloads.get(slug).and_then(Value::as_object).cloned()
    }

    async fn fetch_active_stats(&self, _slug: &str) -> Option<RawSeries> {
        None
    }

    async fn fetch_platform_version(&self) -> Option<String> {
        self.platform_version.clone()
    }
}

pub fn now() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

/// Up to date, fully resolved support, good rating. Scores 0 against 6.5.
pub fn healthy(slug: &str) -> Value {
    json!({
        "slug": slug,
        "name": format!("Plugin {slug}"),
        "version": "2.1.0",
        "tested": "6.5",
        "rating": 96,
        "support_threads": 4,
        "support_threads_resolved": 4,
        "last_updated": "2024-05-28 10:00am GMT",
    })
}

/// Stale on every axis. Scores 8 against 6.5.
pub fn abandoned(slug: &str) -> Value {
    json!({
        "slug": slug,
        "tested": "4.9",
        "rating": 40,
        "support_threads": 40,
        "support_threads_resolved": 20,
        "last_updated": "2022-01-01 1:00pm GMT",
    })
}

/// Assemble a dashboard of `healthy`, `abandoned`, and a missing slug.
pub async fn sample_dashboard() -> Dashboard {
    let mut source = FakeSource::new()
        .with_plugin("fresh", healthy("fresh"))
        .with_plugin("stale", abandoned("stale"));
    source.downloads.insert(
        "fresh".into(),
        json!({ "2024-04-01": 10, "2024-04-20": 5, "2024-05-02": 7 }),
    );

    let config = DashboardConfig::new(vec!["fresh".into(), "missing".into(), "stale".into()]);
    assemble(&source, &config, now()).await
}

/// A store already holding [`sample_dashboard`].
pub async fn filled_store() -> Arc<SnapshotStore> {
    let store = Arc::new(SnapshotStore::new());
    store.replace(sample_dashboard().await).await;
    store
}
