use std::time::Duration;

use axum::http::HeaderValue;
use plugdash_pipeline::config::{parse_slug_list, DashboardConfig, DEFAULT_CONCURRENCY};
use plugdash_wporg::api::{
    WpOrgApiConfig, DEFAULT_BASE_URL, DEFAULT_STATS_LIMIT_DAYS, DEFAULT_TIMEOUT,
};

/// Title used when `SITE_NAME` is not set.
pub const DEFAULT_SITE_NAME: &str = "Dash My Plugins";

/// A configuration variable that is set but cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<HeaderValue>,
    /// Inbound HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Dashboard title echoed by `/health`.
    pub site_name: String,
    /// What the refresh loop fetches and how often.
    pub dashboard: DashboardSettings,
}

/// Settings for the pipeline and its upstream client.
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    /// Plugin slugs from `PLUGINS`, in configured order.
    pub slugs: Vec<String>,
    /// Slugs fetched in parallel.
    pub concurrency: usize,
    /// Time between pipeline runs.
    pub refresh_interval: Duration,
    pub upstream: WpOrgApiConfig,
}

impl DashboardSettings {
    pub fn pipeline_config(&self) -> DashboardConfig {
        DashboardConfig::new(self.slugs.clone()).with_concurrency(self.concurrency)
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                     |
    /// |-------------------------|-----------------------------|
    /// | `HOST`                  | `0.0.0.0`                   |
    /// | `PORT`                  | `3000`                      |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`     |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                        |
    /// | `SITE_NAME`             | `Dash My Plugins`           |
    /// | `PLUGINS`               | *(empty)*                   |
    /// | `FETCH_CONCURRENCY`     | `4`                         |
    /// | `REFRESH_INTERVAL_SECS` | `60`                        |
    /// | `WPORG_API_URL`         | `https://api.wordpress.org` |
    /// | `UPSTREAM_TIMEOUT_SECS` | `30`                        |
    /// | `STATS_LOOKBACK_DAYS`   | `730`                       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_var(&lookup, "PORT", 3000)?;

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    value: origin.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let request_timeout_secs: u64 = parse_var(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;
        let site_name = lookup("SITE_NAME")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SITE_NAME.into());

        let slugs = parse_slug_list(&lookup("PLUGINS").unwrap_or_default());
        let concurrency: usize = parse_var(&lookup, "FETCH_CONCURRENCY", DEFAULT_CONCURRENCY)?;
        if concurrency == 0 {
            return Err(ConfigError::Invalid {
                var: "FETCH_CONCURRENCY",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }
        let refresh_secs: u64 = parse_var(&lookup, "REFRESH_INTERVAL_SECS", 60)?;
        if refresh_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "REFRESH_INTERVAL_SECS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        let base_url = lookup("WPORG_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let upstream_timeout_secs: u64 =
            parse_var(&lookup, "UPSTREAM_TIMEOUT_SECS", DEFAULT_TIMEOUT.as_secs())?;
        let stats_limit_days: u32 =
            parse_var(&lookup, "STATS_LOOKBACK_DAYS", DEFAULT_STATS_LIMIT_DAYS)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            site_name,
            dashboard: DashboardSettings {
                slugs,
                concurrency,
                refresh_interval: Duration::from_secs(refresh_secs),
                upstream: WpOrgApiConfig {
                    base_url,
                    timeout: Duration::from_secs(upstream_timeout_secs),
                    stats_limit_days,
                },
            },
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
