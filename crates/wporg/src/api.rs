//! REST API client for the WordPress.org HTTP endpoints.
//!
//! Wraps plugin information, download and active-install statistics, and
//! the core version check using [`reqwest`]. Every request carries the
//! dashboard's User-Agent and is bounded by the client timeout.

use std::time::Duration;

use chrono::NaiveDate;
use plugdash_core::metadata::PluginMetadata;
use plugdash_core::timeseries::RAW_DATE_FORMAT;
use plugdash_core::types::RawSeries;
use serde::Deserialize;
use serde_json::Value;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.wordpress.org";

/// Per-request timeout unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Days of daily statistics requested per series.
pub const DEFAULT_STATS_LIMIT_DAYS: u32 = 730;

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("plugdash/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`WpOrgApi`].
#[derive(Debug, Clone)]
pub struct WpOrgApiConfig {
    /// API root without trailing slash, e.g. `https://api.wordpress.org`.
    pub base_url: String,
    pub timeout: Duration,
    /// `limit` parameter for the statistics endpoints.
    pub stats_limit_days: u32,
}

impl Default for WpOrgApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            stats_limit_days: DEFAULT_STATS_LIMIT_DAYS,
        }
    }
}

/// HTTP client for the WordPress.org API.
pub struct WpOrgApi {
    client: reqwest::Client,
    base_url: String,
    stats_limit_days: u32,
}

/// Outcome of the active-installs request.
///
/// Upstream does not keep install history for every plugin; that is a
/// normal answer, not a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveStats {
    History(RawSeries),
    Unavailable,
}

/// Errors from the WordPress.org REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum WpOrgApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, or a body
    /// that is not JSON).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// WordPress.org returned a non-2xx status code.
    #[error("WordPress.org API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The body was JSON but not the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl WpOrgApiError {
    /// Whether the request was abandoned because it ran past the timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_timeout())
    }
}

/// Response of `core/version-check/1.7`; only the offers matter here.
#[derive(Debug, Deserialize)]
struct VersionCheck {
    #[serde(default)]
    offers: Vec<VersionOffer>,
}

#[derive(Debug, Deserialize)]
struct VersionOffer {
    version: Option<String>,
}

impl WpOrgApi {
    /// Create a client with its own connection pool.
    pub fn new(config: &WpOrgApiConfig) -> Result<Self, WpOrgApiError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;
        Ok(Self::with_client(
            client,
            config.base_url.clone(),
            config.stats_limit_days,
        ))
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    ///
    /// The caller is responsible for its timeout and User-Agent.
    pub fn with_client(client: reqwest::Client, base_url: String, stats_limit_days: u32) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            stats_limit_days,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch plugin information.
    ///
    /// Sends `GET /plugins/info/1.2/?action=plugin_information&request[slug]={slug}`.
    /// Unknown plugins come back as a 404 with an `error` body.
    pub async fn plugin_info(&self, slug: &str) -> Result<PluginMetadata, WpOrgApiError> {
        let response = self
            .client
            .get(format!("{}/plugins/info/1.2/", self.base_url))
            .query(&[("action", "plugin_information"), ("request[slug]", slug)])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch daily download counts.
    ///
    /// Sends `GET /stats/plugin/1.0/downloads.php?slug={slug}&limit={days}`.
    /// An empty JSON array (upstream's "nothing recorded") yields an empty
    /// series.
    pub async fn downloads_stats(&self, slug: &str) -> Result<RawSeries, WpOrgApiError> {
        let body = self.stats(slug, "downloads.php").await?;
        match body {
            Value::Object(map) => Ok(map),
            Value::Array(items) if items.is_empty() => Ok(RawSeries::new()),
            other => Err(WpOrgApiError::Decode(format!(
                "downloads for '{slug}' is not an object: {}",
                json_kind(&other)
            ))),
        }
    }

    /// Fetch the active-install history.
    ///
    /// Sends `GET /stats/plugin/1.0/active-installs.php?slug={slug}&limit={days}`.
    pub async fn active_stats(&self, slug: &str) -> Result<ActiveStats, WpOrgApiError> {
        let body = self.stats(slug, "active-installs.php").await?;
        Ok(classify_active_stats(body))
    }

    /// Fetch the latest stable WordPress version.
    ///
    /// Sends `GET /core/version-check/1.7/`; the first offer is the latest
    /// stable release.
    pub async fn platform_version(&self) -> Result<String, WpOrgApiError> {
        let response = self
            .client
            .get(format!("{}/core/version-check/1.7/", self.base_url))
            .send()
            .await?;

        let check: VersionCheck = Self::parse_response(response).await?;
        latest_offer_version(check)
    }

    // ---- private helpers ----

    async fn stats(&self, slug: &str, endpoint: &str) -> Result<Value, WpOrgApiError> {
        let response = self
            .client
            .get(format!("{}/stats/plugin/1.0/{endpoint}", self.base_url))
            .query(&[("slug", slug)])
            .query(&[("limit", self.stats_limit_days)])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`WpOrgApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, WpOrgApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(WpOrgApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, WpOrgApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

// ---------------------------------------------------------------------------
// Payload interpretation
// ---------------------------------------------------------------------------

/// Decide whether an active-installs body carries history.
///
/// Only an object with at least one `YYYY-MM-DD` key counts; empty objects,
/// arrays, `null`, and error objects mean no history is available.
pub fn classify_active_stats(body: Value) -> ActiveStats {
    match body {
        Value::Object(map)
            if map
                .keys()
                .any(|k| NaiveDate::parse_from_str(k.trim(), RAW_DATE_FORMAT).is_ok()) =>
        {
            ActiveStats::History(map)
        }
        _ => ActiveStats::Unavailable,
    }
}

fn latest_offer_version(check: VersionCheck) -> Result<String, WpOrgApiError> {
    check
        .offers
        .into_iter()
        .next()
        .and_then(|offer| offer.version)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| WpOrgApiError::Decode("version check returned no offers".into()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
