//! Periodic dashboard rebuild.
//!
//! Runs the pipeline once at startup and then on a fixed interval, storing
//! each result in the [`SnapshotStore`]. A run is never merged with the
//! previous one; the whole dashboard is replaced.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use plugdash_pipeline::assembler::assemble;
use plugdash_wporg::source::PluginSource;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::DashboardSettings;
use crate::snapshot::SnapshotStore;

/// Run the refresh loop until `cancel` is triggered.
pub async fn run<S>(
    source: Arc<S>,
    settings: DashboardSettings,
    store: Arc<SnapshotStore>,
    cancel: CancellationToken,
) where
    S: PluginSource + ?Sized,
{
    let config = settings.pipeline_config();
    if config.slugs.is_empty() {
        tracing::warn!("No plugins configured, the dashboard will stay empty");
    }

    tracing::info!(
        plugins = config.slugs.len(),
        concurrency = config.concurrency,
        interval_secs = settings.refresh_interval.as_secs(),
        "Dashboard refresh job started"
    );

    // The first tick completes immediately.
    let mut interval = tokio::time::interval(settings.refresh_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Dashboard refresh job stopping");
                break;
            }
            _ = interval.tick() => {
                let started = Instant::now();
                let dashboard = tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("Dashboard refresh cancelled mid-run");
                        break;
                    }
                    dashboard = assemble(source.as_ref(), &config, Utc::now()) => dashboard,
                };

                tracing::info!(
                    plugins = dashboard.plugins.len(),
                    skipped = dashboard.skipped.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Dashboard refreshed"
                );
                store.replace(dashboard).await;
            }
        }
    }
}
