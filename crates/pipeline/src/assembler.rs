//! Fan-out over the configured slugs.
//!
//! Each slug's three fetches run concurrently, and up to
//! [`DashboardConfig::concurrency`] slugs are in flight at once. Per-slug
//! results are collected in configured order and merged afterwards, so no
//! task touches a shared list.

use futures::stream::{self, StreamExt};
use plugdash_core::record::build_record;
use plugdash_core::slack::{score_plugin, ScoredPlugin};
use plugdash_core::timeseries::RejectedSample;
use plugdash_core::types::Timestamp;
use plugdash_core::version::UNKNOWN_PLATFORM_VERSION;
use plugdash_wporg::source::PluginSource;

use crate::config::DashboardConfig;
use crate::dashboard::{Dashboard, SkipReason, SkippedPlugin};

/// Run the whole pipeline once.
///
/// Never fails: unusable slugs end up in [`Dashboard::skipped`] and a failed
/// platform-version lookup falls back to [`UNKNOWN_PLATFORM_VERSION`].
pub async fn assemble<S>(source: &S, config: &DashboardConfig, now: Timestamp) -> Dashboard
where
    S: PluginSource + ?Sized,
{
    let platform_version = match source.fetch_platform_version().await {
        Some(version) => version,
        None => {
            tracing::warn!("Platform version unavailable, scoring against placeholder");
            UNKNOWN_PLATFORM_VERSION.to_string()
        }
    };

    // Owned slugs keep the returned future `Send`, so it can run on a spawned task.
    let platform = platform_version.as_str();
    let outcomes: Vec<Result<ScoredPlugin, SkippedPlugin>> = stream::iter(config.slugs.clone())
        .map(move |slug| async move { process_slug(source, &slug, platform, now).await })
        .buffered(config.concurrency.max(1))
        .collect()
        .await;

    let mut plugins = Vec::with_capacity(outcomes.len());
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(plugin) => plugins.push(plugin),
            Err(skip) => skipped.push(skip),
        }
    }

    sort_worst_first(&mut plugins);

    tracing::info!(
        platform_version = %platform_version,
        plugins = plugins.len(),
        skipped = skipped.len(),
        "Dashboard assembled"
    );

    Dashboard {
        generated_at: now,
        platform_version,
        plugins,
        skipped,
    }
}

/// Order by composite slack score, highest first. Ties keep their
/// configured order.
pub fn sort_worst_first(plugins: &mut [ScoredPlugin]) {
    plugins.sort_by(|a, b| b.slack.slack_score.cmp(&a.slack.slack_score));
}

async fn process_slug<S>(
    source: &S,
    slug: &str,
    platform_version: &str,
    now: Timestamp,
) -> Result<ScoredPlugin, SkippedPlugin>
where
    S: PluginSource + ?Sized,
{
    let (metadata, downloads, active_installs) = tokio::join!(
        source.fetch_plugin_info(slug),
        source.fetch_downloads_stats(slug),
        source.fetch_active_stats(slug),
    );

    let Some(metadata) = metadata else {
        tracing::warn!(slug, "No plugin information, skipping");
        return Err(SkippedPlugin {
            slug: slug.to_string(),
            reason: SkipReason::MetadataUnavailable,
        });
    };

    let built = build_record(&metadata, downloads.as_ref(), active_installs.as_ref(), now)
        .map_err(|e| {
            tracing::warn!(slug, error = %e, "Unusable plugin information, skipping");
            SkippedPlugin {
                slug: slug.to_string(),
                reason: SkipReason::InvalidMetadata(e.to_string()),
            }
        })?;

    log_rejected(slug, "downloads", &built.rejected_downloads);
    log_rejected(slug, "active_installs", &built.rejected_active_installs);

    let plugin = score_plugin(built.record, platform_version, now);
    tracing::debug!(slug, slack_score = plugin.slack.slack_score, "Plugin scored");
    Ok(plugin)
}

fn log_rejected(slug: &str, series: &'static str, rejected: &[RejectedSample]) {
    for sample in rejected {
        tracing::warn!(
            slug,
            series,
            key = %sample.key,
            reason = ?sample.reason,
            "Malformed statistics sample"
        );
    }
}
