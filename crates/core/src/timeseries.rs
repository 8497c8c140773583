//! Monthly bucketing of daily download and active-install statistics.
//!
//! The stats endpoints return one sample per day, keyed by `YYYY-MM-DD`,
//! with values that are sometimes numbers and sometimes numeric strings.
//! [`normalize_monthly`] turns that mapping into a [`BucketedSeries`] with
//! one point per calendar month, dated on the month's last day.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::coerce::try_f64;
use crate::types::RawSeries;

/// Date format of the raw series keys.
pub const RAW_DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One parsed daily sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// One monthly bucket: the month's last day and the sum of its samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Ordered monthly series.
///
/// Dates are strictly increasing month ends; no two points share a month.
/// Points only enter through [`bucket_monthly`], deserialization included,
/// so the invariant holds for any input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<SeriesPoint>", into = "Vec<SeriesPoint>")]
pub struct BucketedSeries {
    points: Vec<SeriesPoint>,
}

impl From<Vec<SeriesPoint>> for BucketedSeries {
    fn from(points: Vec<SeriesPoint>) -> Self {
        bucket_monthly(points.into_iter().map(|p| RawPoint {
            date: p.date,
            value: p.value,
        }))
    }
}

impl From<BucketedSeries> for Vec<SeriesPoint> {
    fn from(series: BucketedSeries) -> Self {
        series.points
    }
}

impl BucketedSeries {
    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// View the buckets as raw points, e.g. to re-bucket them.
    pub fn to_raw_points(&self) -> Vec<RawPoint> {
        self.points
            .iter()
            .map(|p| RawPoint {
                date: p.date,
                value: p.value,
            })
            .collect()
    }
}

/// Why a raw sample could not be used as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The key is not a `YYYY-MM-DD` date; the sample is dropped.
    InvalidDate,
    /// The value is not numeric; the sample counts as `0`.
    NonNumericValue,
}

/// A raw sample flagged during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedSample {
    pub key: String,
    pub reason: RejectReason,
}

/// A parse result together with the samples flagged along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub rejected: Vec<RejectedSample>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a raw `date -> value` mapping into points.
///
/// Keys that are not dates are dropped. Values that are not numeric become
/// `0.0` so they cannot poison a bucket sum. Both cases are reported in
/// [`Parsed::rejected`].
pub fn parse_raw_series(raw: &RawSeries) -> Parsed<Vec<RawPoint>> {
    let mut points = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();

    for (key, value) in raw {
        let Ok(date) = NaiveDate::parse_from_str(key.trim(), RAW_DATE_FORMAT) else {
            rejected.push(RejectedSample {
                key: key.clone(),
                reason: RejectReason::InvalidDate,
            });
            continue;
        };

        let value = try_f64(value).unwrap_or_else(|| {
            rejected.push(RejectedSample {
                key: key.clone(),
                reason: RejectReason::NonNumericValue,
            });
            0.0
        });

        points.push(RawPoint { date, value });
    }

    Parsed {
        value: points,
        rejected,
    }
}

// ---------------------------------------------------------------------------
// Bucketing
// ---------------------------------------------------------------------------

/// Last calendar day of the month containing `date`.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Sum samples into monthly buckets dated at each month's end.
///
/// Output is ordered by month ascending, which for date-ordered input is the
/// order in which months were first seen.
pub fn bucket_monthly(points: impl IntoIterator<Item = RawPoint>) -> BucketedSeries {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for point in points {
        *buckets.entry(end_of_month(point.date)).or_insert(0.0) += point.value;
    }

    BucketedSeries {
        points: buckets
            .into_iter()
            .map(|(date, value)| SeriesPoint { date, value })
            .collect(),
    }
}

/// Parse and bucket a raw series in one step.
pub fn normalize_monthly(raw: &RawSeries) -> Parsed<BucketedSeries> {
    let parsed = parse_raw_series(raw);
    Parsed {
        value: bucket_monthly(parsed.value),
        rejected: parsed.rejected,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn raw(value: serde_json::Value) -> RawSeries {
        value.as_object().unwrap().clone()
    }

    // -- end_of_month ----------------------------------------------------

    #[test]
    fn end_of_month_handles_month_lengths() {
        assert_eq!(end_of_month(date(2024, 1, 5)), date(2024, 1, 31));
        assert_eq!(end_of_month(date(2024, 2, 1)), date(2024, 2, 29));
        assert_eq!(end_of_month(date(2023, 2, 14)), date(2023, 2, 28));
        assert_eq!(end_of_month(date(2024, 4, 30)), date(2024, 4, 30));
        assert_eq!(end_of_month(date(2024, 12, 25)), date(2024, 12, 31));
    }

    // -- normalize_monthly -----------------------------------------------

    #[test]
    fn sums_samples_within_each_month() {
        let input = raw(json!({
            "2024-01-05": 10,
            "2024-01-20": "5",
            "2024-02-01": 3,
        }));

        let out = normalize_monthly(&input);

        assert!(out.rejected.is_empty());
        assert_eq!(
            out.value.points(),
            &[
                SeriesPoint { date: date(2024, 1, 31), value: 15.0 },
                SeriesPoint { date: date(2024, 2, 29), value: 3.0 },
            ]
        );
    }

    #[test]
    fn empty_input_gives_empty_series() {
        let out = normalize_monthly(&RawSeries::new());
        assert!(out.value.is_empty());
        assert!(out.rejected.is_empty());
    }

    #[test]
    fn point_count_equals_distinct_months() {
        let mut input = RawSeries::new();
        for day in 1..=31 {
            input.insert(format!("2023-03-{day:02}"), json!(1));
        }
        for day in 1..=30 {
            input.insert(format!("2023-04-{day:02}"), json!("2"));
        }
        input.insert("2023-06-15".into(), json!(7));

        let out = normalize_monthly(&input);

        assert_eq!(out.value.len(), 3);
        assert_eq!(out.value.points()[0].value, 31.0);
        assert_eq!(out.value.points()[1].value, 60.0);
        assert_eq!(out.value.points()[2].date, date(2023, 6, 30));
    }

    #[test]
    fn dates_are_strictly_increasing_even_for_unordered_input() {
        let points = vec![
            RawPoint { date: date(2024, 3, 2), value: 1.0 },
            RawPoint { date: date(2024, 1, 9), value: 2.0 },
            RawPoint { date: date(2024, 3, 30), value: 4.0 },
        ];

        let series = bucket_monthly(points);

        let dates: Vec<_> = series.points().iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 31), date(2024, 3, 31)]);
        assert_eq!(series.points()[1].value, 5.0);
    }

    #[test]
    fn rebucketing_is_idempotent() {
        let input = raw(json!({
            "2023-11-02": 4,
            "2023-11-28": 6,
            "2023-12-31": 1,
            "2024-01-01": 9,
        }));
        let once = normalize_monthly(&input).value;

        let twice = bucket_monthly(once.to_raw_points());

        assert_eq!(once, twice);
    }

    // -- malformed samples -----------------------------------------------

    #[test]
    fn non_numeric_value_counts_as_zero_and_is_flagged() {
        let input = raw(json!({
            "2024-05-01": 8,
            "2024-05-02": "oops",
        }));

        let out = normalize_monthly(&input);

        assert_eq!(out.value.points()[0].value, 8.0);
        assert_eq!(
            out.rejected,
            vec![RejectedSample {
                key: "2024-05-02".into(),
                reason: RejectReason::NonNumericValue,
            }]
        );
    }

    #[test]
    fn invalid_date_key_is_dropped_and_flagged() {
        let input = raw(json!({
            "error": "something",
            "2024-05-01": 8,
        }));

        let out = normalize_monthly(&input);

        assert_eq!(out.value.len(), 1);
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].reason, RejectReason::InvalidDate);
    }

    #[test]
    fn deserializing_rebuckets_arbitrary_points() {
        let series: BucketedSeries = serde_json::from_value(json!([
            { "date": "2024-03-10", "value": 1.0 },
            { "date": "2024-01-31", "value": 2.0 },
            { "date": "2024-03-31", "value": 4.0 },
        ]))
        .unwrap();

        assert_eq!(
            series.points(),
            &[
                SeriesPoint { date: date(2024, 1, 31), value: 2.0 },
                SeriesPoint { date: date(2024, 3, 31), value: 5.0 },
            ]
        );
    }

    #[test]
    fn series_serializes_as_plain_array() {
        let series = bucket_monthly([RawPoint { date: date(2024, 1, 3), value: 2.0 }]);
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json, json!([{ "date": "2024-01-31", "value": 2.0 }]));
    }
}
