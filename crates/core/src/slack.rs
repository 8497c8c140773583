//! Maintenance "slack" scoring.
//!
//! Four independent sub-scores, each 0 (ok), 1 (warning) or 2 (critical),
//! summed into a composite 0-8 used for sorting and card status. Scoring is
//! total: any [`PluginRecord`] scores, whatever upstream put in it.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::record::PluginRecord;
use crate::types::Timestamp;
use crate::version::MajorMinor;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Weeks without a release before the version score turns critical.
pub const VERSION_CRITICAL_WEEKS: i64 = 26;
/// Weeks without a release before the version score warns.
pub const VERSION_WARNING_WEEKS: i64 = 12;

/// Unresolved support percentage that turns critical.
pub const SUPPORT_CRITICAL_PCT: f64 = 30.0;
/// Unresolved support percentage that warns.
pub const SUPPORT_WARNING_PCT: f64 = 10.0;

/// Rating at or above which no slack is reported.
pub const RATING_OK_MIN: i64 = 85;
/// Rating at or above which only a warning is reported.
pub const RATING_WARNING_MIN: i64 = 75;

/// Composite score at or above which the card is critical.
pub const CARD_CRITICAL_MIN: u8 = 6;
/// Composite score at or above which the card warns.
pub const CARD_WARNING_MIN: u8 = 2;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Overall card status derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Ok,
    Warning,
    Critical,
}

impl CardStatus {
    pub fn from_slack_score(score: u8) -> Self {
        if score >= CARD_CRITICAL_MIN {
            Self::Critical
        } else if score >= CARD_WARNING_MIN {
            Self::Warning
        } else {
            Self::Ok
        }
    }
}

/// All sub-scores plus the composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackScores {
    pub version_slack_score: u8,
    pub tested_slack_score: u8,
    pub support_slack_score: u8,
    pub rating_slack_score: u8,
    /// Sum of the four sub-scores (0-8).
    pub slack_score: u8,
    pub status: CardStatus,
}

/// A record together with its scores; serializes as one flat object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPlugin {
    #[serde(flatten)]
    pub record: PluginRecord,
    #[serde(flatten)]
    pub slack: SlackScores,
}

// ---------------------------------------------------------------------------
// Sub-scores
// ---------------------------------------------------------------------------

/// Score release staleness from the time elapsed since `last_updated`.
pub fn version_slack(last_updated: Timestamp, now: Timestamp) -> u8 {
    let elapsed = now - last_updated;
    if elapsed >= Duration::weeks(VERSION_CRITICAL_WEEKS) {
        2
    } else if elapsed >= Duration::weeks(VERSION_WARNING_WEEKS) {
        1
    } else {
        0
    }
}

/// Score compatibility drift between the current platform version and the
/// version a plugin was last tested with.
///
/// Unparsable input on either side (including the "Unknown" placeholder)
/// scores 0.
pub fn tested_slack(platform_version: &str, tested: Option<&str>) -> u8 {
    let (Some(platform), Some(tested)) = (
        MajorMinor::parse(platform_version),
        tested.and_then(MajorMinor::parse),
    ) else {
        return 0;
    };

    let major_gap = i64::from(platform.major) - i64::from(tested.major);
    let minor_gap = i64::from(platform.minor) - i64::from(tested.minor);

    if major_gap >= 2 {
        2
    } else if major_gap == 1 || (major_gap == 0 && minor_gap >= 2) {
        1
    } else {
        0
    }
}

/// Percentage of support threads still unresolved.
///
/// A negative pending count (upstream resolved more than it opened) is
/// clamped to zero; no threads at all is 0%.
pub fn unresolved_support_pct(pending: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    pending.clamp(0, total) as f64 / total as f64 * 100.0
}

/// Score the support backlog as a share of all threads.
pub fn support_slack(pending: i64, total: i64) -> u8 {
    let pct = unresolved_support_pct(pending, total);
    if pct >= SUPPORT_CRITICAL_PCT {
        2
    } else if pct >= SUPPORT_WARNING_PCT {
        1
    } else {
        0
    }
}

/// Score the aggregate rating (0-100).
pub fn rating_slack(rating: i64) -> u8 {
    if rating >= RATING_OK_MIN {
        0
    } else if rating >= RATING_WARNING_MIN {
        1
    } else {
        2
    }
}

// ---------------------------------------------------------------------------
// Composite
// ---------------------------------------------------------------------------

/// Score a record against the current platform version.
pub fn score(record: &PluginRecord, platform_version: &str, now: Timestamp) -> SlackScores {
    let version_slack_score = version_slack(record.last_updated, now);
    let tested_slack_score = tested_slack(platform_version, record.tested.as_deref());
    let support_slack_score = support_slack(record.support_threads, record.support_threads_total);
    let rating_slack_score = rating_slack(record.rating);

    let slack_score =
        version_slack_score + tested_slack_score + support_slack_score + rating_slack_score;

    SlackScores {
        version_slack_score,
        tested_slack_score,
        support_slack_score,
        rating_slack_score,
        slack_score,
        status: CardStatus::from_slack_score(slack_score),
    }
}

/// Score a record and attach the result.
pub fn score_plugin(record: PluginRecord, platform_version: &str, now: Timestamp) -> ScoredPlugin {
    let slack = score(&record, platform_version, now);
    ScoredPlugin { record, slack }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
