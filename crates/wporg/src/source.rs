//! The fetch boundary used by the dashboard pipeline.
//!
//! [`PluginSource`] methods never fail: a transport problem is logged here,
//! with the slug and endpoint, and surfaces to the caller as `None`.
//! Missing install history is also `None` but is not an error and is only
//! logged at debug level.

use async_trait::async_trait;
use plugdash_core::metadata::PluginMetadata;
use plugdash_core::types::RawSeries;

use crate::api::{ActiveStats, WpOrgApi, WpOrgApiError};

/// Source of raw plugin payloads.
#[async_trait]
pub trait PluginSource: Send + Sync {
    /// Plugin information, or `None` if it could not be fetched.
    async fn fetch_plugin_info(&self, slug: &str) -> Option<PluginMetadata>;

    /// Daily download counts, or `None` if they could not be fetched.
    async fn fetch_downloads_stats(&self, slug: &str) -> Option<RawSeries>;

    /// Daily active-install history, or `None` if unavailable.
    async fn fetch_active_stats(&self, slug: &str) -> Option<RawSeries>;

    /// Latest stable WordPress version, or `None` if it could not be fetched.
    async fn fetch_platform_version(&self) -> Option<String>;
}

#[async_trait]
impl PluginSource for WpOrgApi {
    async fn fetch_plugin_info(&self, slug: &str) -> Option<PluginMetadata> {
        self.plugin_info(slug)
            .await
            .map_err(|e| log_failure("plugin_info", Some(slug), &e))
            .ok()
    }

    async fn fetch_downloads_stats(&self, slug: &str) -> Option<RawSeries> {
        self.downloads_stats(slug)
            .await
            .map_err(|e| log_failure("downloads", Some(slug), &e))
            .ok()
    }

    async fn fetch_active_stats(&self, slug: &str) -> Option<RawSeries> {
        match self.active_stats(slug).await {
            Ok(ActiveStats::History(series)) => Some(series),
            Ok(ActiveStats::Unavailable) => {
                tracing::debug!(slug, "No active-install history available");
                None
            }
            Err(e) => {
                log_failure("active_installs", Some(slug), &e);
                None
            }
        }
    }

    async fn fetch_platform_version(&self) -> Option<String> {
        self.platform_version()
            .await
            .map_err(|e| log_failure("version_check", None, &e))
            .ok()
    }
}

/// Log a failed upstream call. Timeouts are expected now and then and are
/// reported as warnings; everything else is an error.
fn log_failure(endpoint: &'static str, slug: Option<&str>, err: &WpOrgApiError) {
    if err.is_timeout() {
        tracing::warn!(endpoint, slug, error = %err, "WordPress.org request timed out");
    } else {
        tracing::error!(endpoint, slug, error = %err, "WordPress.org request failed");
    }
}
