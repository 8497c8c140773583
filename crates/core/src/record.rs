//! Plugin record construction.
//!
//! [`build_record`] merges the plugin-information payload with the two
//! statistics series into a [`PluginRecord`]. A record is only produced for
//! payloads with a slug and a parsable `last_updated`; every numeric field
//! is coerced with [`crate::coerce`] so the rest of the payload can be as
//! messy as upstream makes it.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::coerce::{coerce_i64, coerce_string};
use crate::error::CoreError;
use crate::metadata::{Banners, PluginMetadata, Screenshot, Tag};
use crate::relative_time::relative_time;
use crate::timeseries::{normalize_monthly, BucketedSeries, RejectedSample, RAW_DATE_FORMAT};
use crate::types::{RawSeries, Timestamp};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One plugin's normalized metadata and statistics, ready to be scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginRecord {
    pub slug: String,
    pub name: String,
    /// Latest release, kept as the dotted string upstream sent.
    pub version: Option<String>,
    /// Highest WordPress version the plugin declares compatibility with.
    pub tested: Option<String>,
    pub requires: Option<String>,
    /// Aggregate rating, 0-100.
    pub rating: i64,
    pub num_ratings: i64,
    /// Star count (1-5) to number of reviews.
    pub ratings: BTreeMap<u8, i64>,
    pub active_installs: i64,
    /// Unresolved support threads (`total - resolved`). Negative when
    /// upstream counts disagree.
    pub support_threads: i64,
    pub support_threads_total: i64,
    pub support_threads_resolved: i64,
    pub last_updated: Timestamp,
    pub readable_time: String,
    pub banners: Banners,
    pub screenshots: Vec<Screenshot>,
    pub tags: Vec<Tag>,
    pub downloads: BucketedSeries,
    /// `None` when upstream has no install history for the plugin.
    pub active_installs_history: Option<BucketedSeries>,
}

/// A built record plus the raw series samples that had to be discarded or
/// zeroed while normalizing.
#[derive(Debug, Clone)]
pub struct BuiltRecord {
    pub record: PluginRecord,
    pub rejected_downloads: Vec<RejectedSample>,
    pub rejected_active_installs: Vec<RejectedSample>,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build a record from upstream payloads.
///
/// * `downloads` - `None` when the downloads fetch failed; yields an empty
///   series.
/// * `active_installs` - `None` when upstream has no history; stays `None`.
/// * `now` - reference instant for [`PluginRecord::readable_time`].
pub fn build_record(
    meta: &PluginMetadata,
    downloads: Option<&RawSeries>,
    active_installs: Option<&RawSeries>,
    now: Timestamp,
) -> Result<BuiltRecord, CoreError> {
    let slug = meta.slug().ok_or(CoreError::MissingField("slug"))?;

    let raw_updated =
        coerce_string(meta.last_updated.as_ref()).ok_or(CoreError::MissingField("last_updated"))?;
    let last_updated = parse_last_updated(&raw_updated)?;

    let support_threads_total = coerce_i64(meta.support_threads.as_ref());
    let support_threads_resolved = coerce_i64(meta.support_threads_resolved.as_ref());

    let (downloads, rejected_downloads) = match downloads {
        Some(raw) => {
            let parsed = normalize_monthly(raw);
            (parsed.value, parsed.rejected)
        }
        None => (BucketedSeries::default(), Vec::new()),
    };

    let (active_installs_history, rejected_active_installs) = match active_installs {
        Some(raw) => {
            let parsed = normalize_monthly(raw);
            (Some(parsed.value), parsed.rejected)
        }
        None => (None, Vec::new()),
    };

    let record = PluginRecord {
        name: coerce_string(meta.name.as_ref()).unwrap_or_else(|| slug.clone()),
        slug,
        version: coerce_string(meta.version.as_ref()),
        tested: coerce_string(meta.tested.as_ref()),
        requires: coerce_string(meta.requires.as_ref()),
        rating: coerce_i64(meta.rating.as_ref()),
        num_ratings: coerce_i64(meta.num_ratings.as_ref()),
        ratings: meta.ratings(),
        active_installs: coerce_i64(meta.active_installs.as_ref()),
        support_threads: support_threads_total - support_threads_resolved,
        support_threads_total,
        support_threads_resolved,
        last_updated,
        readable_time: relative_time(last_updated, now),
        banners: meta.banners(),
        screenshots: meta.screenshots(),
        tags: meta.tags(),
        downloads,
        active_installs_history,
    };

    Ok(BuiltRecord {
        record,
        rejected_downloads,
        rejected_active_installs,
    })
}

// ---------------------------------------------------------------------------
// Timestamp parsing
// ---------------------------------------------------------------------------

/// Zone markers accepted after the time; all mean UTC.
const UTC_MARKERS: &[&str] = &["GMT", "UTC", "Z"];

/// Parse upstream's `last_updated`, e.g. `"2024-01-15 3:45pm GMT"`.
///
/// The time and zone marker are optional (`"2024-01-15"` is midnight UTC).
/// A marker other than GMT/UTC is rejected rather than silently treated as
/// UTC.
pub fn parse_last_updated(raw: &str) -> Result<Timestamp, CoreError> {
    let invalid = || CoreError::InvalidTimestamp {
        value: raw.to_string(),
    };

    let mut tokens: Vec<&str> = raw.split_whitespace().collect();

    let has_marker = tokens.len() > 1
        && tokens
            .last()
            .is_some_and(|t| t.chars().all(|c| c.is_ascii_alphabetic()));
    if has_marker {
        let marker = tokens.pop().unwrap_or_default();
        if !UTC_MARKERS.iter().any(|m| m.eq_ignore_ascii_case(marker)) {
            return Err(invalid());
        }
    }

    let (date, time) = match tokens.as_slice() {
        [date] => (*date, None),
        [date, time] => (*date, Some(*time)),
        _ => return Err(invalid()),
    };

    let date = NaiveDate::parse_from_str(date, RAW_DATE_FORMAT).map_err(|_| invalid())?;
    let time = match time {
        Some(t) => parse_clock_time(t).ok_or_else(invalid)?,
        None => NaiveTime::default(),
    };

    Ok(date.and_time(time).and_utc())
}

/// Parse `"3:45pm"`, `"12:05am"`, or 24-hour `"15:45"`.
fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    let lower = raw.to_ascii_lowercase();
    let (clock, meridiem) = if let Some(rest) = lower.strip_suffix("am") {
        (rest, Some(false))
    } else if let Some(rest) = lower.strip_suffix("pm") {
        (rest, Some(true))
    } else {
        (lower.as_str(), None)
    };

    let (hour, minute) = clock.trim().split_once(':')?;
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;

    let hour = match meridiem {
        Some(is_pm) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            match (hour, is_pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, false) => h,
                (h, true) => h + 12,
            }
        }
        None => hour,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn metadata(value: serde_json::Value) -> PluginMetadata {
        serde_json::from_value(value).unwrap()
    }

    fn full_metadata() -> PluginMetadata {
        metadata(json!({
            "slug": "media-cleaner",
            "name": "Media Cleaner",
            "version": "6.10",
            "tested": "6.5.2",
            "requires": "6.0",
            "rating": 92,
            "num_ratings": "410",
            "ratings": { "5": 380, "1": 12 },
            "support_threads": "40",
            "support_threads_resolved": 25,
            "active_installs": 100000,
            "last_updated": "2024-05-20 3:45pm GMT",
            "banners": { "low": "low.png", "high": "high.png" },
            "tags": { "media": "Media" },
            "screenshots": { "1": { "src": "one.png", "caption": "One" } },
        }))
    }

    // -- parse_last_updated ----------------------------------------------

    #[test]
    fn parses_upstream_format_as_utc() {
        let ts = parse_last_updated("2024-01-15 3:45pm GMT").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 15, 15, 45, 0).unwrap());
    }

    #[test]
    fn parses_midnight_and_noon() {
        assert_eq!(
            parse_last_updated("2024-01-15 12:05am GMT").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 5, 0).unwrap()
        );
        assert_eq!(
            parse_last_updated("2024-01-15 12:30pm UTC").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 12, 30, 0).unwrap()
        );
    }

    #[test]
    fn date_only_is_midnight() {
        assert_eq!(
            parse_last_updated("2023-12-01").unwrap(),
            Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn rejects_malformed_timestamps() {
        for raw in ["", "yesterday", "2024-13-01 1:00pm GMT", "2024-01-01 13:00pm GMT", "2024-01-01 1:00pm EST"] {
            assert_matches!(
                parse_last_updated(raw),
                Err(CoreError::InvalidTimestamp { .. }),
                "expected {raw:?} to be rejected"
            );
        }
    }

    // -- build_record ----------------------------------------------------

    #[test]
    fn builds_complete_record() {
        let downloads = json!({ "2024-04-02": "10", "2024-04-30": 5, "2024-05-01": "7" });
        let active = json!({ "2024-05-01": 1.5 });

        let built = build_record(
            &full_metadata(),
            downloads.as_object(),
            active.as_object(),
            now(),
        )
        .unwrap();
        let record = built.record;

        assert_eq!(record.slug, "media-cleaner");
        assert_eq!(record.name, "Media Cleaner");
        assert_eq!(record.version.as_deref(), Some("6.10"));
        assert_eq!(record.tested.as_deref(), Some("6.5.2"));
        assert_eq!(record.rating, 92);
        assert_eq!(record.num_ratings, 410);
        assert_eq!(record.ratings.get(&5), Some(&380));
        assert_eq!(record.active_installs, 100_000);
        assert_eq!(record.support_threads, 15);
        assert_eq!(record.support_threads_total, 40);
        assert_eq!(record.readable_time, "11 days ago");
        assert_eq!(record.banners.high.as_deref(), Some("high.png"));
        assert_eq!(record.tags.len(), 1);
        assert_eq!(record.screenshots.len(), 1);
        assert_eq!(record.downloads.len(), 2);
        assert_eq!(record.downloads.points()[0].value, 15.0);
        assert_eq!(record.active_installs_history.map(|s| s.len()), Some(1));
        assert!(built.rejected_downloads.is_empty());
    }

    #[test]
    fn missing_slug_is_rejected() {
        let meta = metadata(json!({ "name": "No Slug", "last_updated": "2024-01-01" }));
        assert_matches!(
            build_record(&meta, None, None, now()),
            Err(CoreError::MissingField("slug"))
        );
    }

    #[test]
    fn missing_or_invalid_last_updated_is_rejected() {
        let meta = metadata(json!({ "slug": "a" }));
        assert_matches!(
            build_record(&meta, None, None, now()),
            Err(CoreError::MissingField("last_updated"))
        );

        let meta = metadata(json!({ "slug": "a", "last_updated": "not a date" }));
        assert_matches!(
            build_record(&meta, None, None, now()),
            Err(CoreError::InvalidTimestamp { .. })
        );
    }

    #[test]
    fn sparse_payload_defaults_to_zero() {
        let meta = metadata(json!({
            "slug": "tiny",
            "last_updated": "2024-05-01",
            "rating": "n/a",
            "support_threads": null,
        }));

        let record = build_record(&meta, None, None, now()).unwrap().record;

        assert_eq!(record.name, "tiny");
        assert_eq!(record.rating, 0);
        assert_eq!(record.num_ratings, 0);
        assert_eq!(record.support_threads, 0);
        assert_eq!(record.version, None);
        assert!(record.downloads.is_empty());
        assert_eq!(record.active_installs_history, None);
    }

    #[test]
    fn resolved_above_total_goes_negative() {
        let meta = metadata(json!({
            "slug": "odd",
            "last_updated": "2024-05-01",
            "support_threads": 3,
            "support_threads_resolved": 5,
        }));

        let record = build_record(&meta, None, None, now()).unwrap().record;

        assert_eq!(record.support_threads, -2);
    }

    #[test]
    fn empty_history_differs_from_absent_history() {
        let empty = json!({});
        let meta = full_metadata();

        let with_empty = build_record(&meta, None, empty.as_object(), now()).unwrap().record;
        let without = build_record(&meta, None, None, now()).unwrap().record;

        assert_eq!(with_empty.active_installs_history, Some(BucketedSeries::default()));
        assert_eq!(without.active_installs_history, None);
    }

    #[test]
    fn rejected_samples_are_reported() {
        let downloads = json!({ "2024-05-01": "x", "garbage": 1 });

        let built = build_record(&full_metadata(), downloads.as_object(), None, now()).unwrap();

        assert_eq!(built.rejected_downloads.len(), 2);
        assert_eq!(built.record.downloads.len(), 1);
        assert_eq!(built.record.downloads.points()[0].value, 0.0);
    }
}
