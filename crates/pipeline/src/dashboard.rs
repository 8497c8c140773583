//! The assembled dashboard.

use plugdash_core::slack::ScoredPlugin;
use plugdash_core::types::Timestamp;
use serde::Serialize;

/// Result of one pipeline run. Rebuilt from scratch on every refresh.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub generated_at: Timestamp,
    /// Latest stable WordPress version, or "Unknown" if the lookup failed.
    pub platform_version: String,
    /// Scored plugins, highest slack score first.
    pub plugins: Vec<ScoredPlugin>,
    /// Configured slugs that produced no record, in configured order.
    pub skipped: Vec<SkippedPlugin>,
}

impl Dashboard {
    /// First plugin with the given slug.
    pub fn plugin(&self, slug: &str) -> Option<&ScoredPlugin> {
        self.plugins.iter().find(|p| p.record.slug == slug)
    }
}

/// A configured slug left out of the dashboard, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPlugin {
    pub slug: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// The plugin-information fetch failed.
    MetadataUnavailable,
    /// The payload arrived but could not be turned into a record.
    InvalidMetadata(String),
}
