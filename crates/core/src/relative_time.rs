//! Human-relative rendering of timestamps ("3 months ago").
//!
//! Thresholds follow the common day.js wording so the dashboard reads the
//! same as the web front end did.

use crate::types::Timestamp;

const AVG_DAYS_PER_MONTH: f64 = 30.436875;

/// Render `then` relative to `now`, e.g. `"a day ago"` or `"in 2 hours"`.
pub fn relative_time(then: Timestamp, now: Timestamp) -> String {
    let secs = (now - then).num_seconds();
    let phrase = describe_span(secs.unsigned_abs());
    if secs < 0 {
        format!("in {phrase}")
    } else {
        format!("{phrase} ago")
    }
}

fn describe_span(secs: u64) -> String {
    let secs = secs as f64;
    if secs <= 44.0 {
        return "a few seconds".into();
    }
    if secs <= 89.0 {
        return "a minute".into();
    }

    let minutes = (secs / 60.0).round();
    if minutes <= 44.0 {
        return format!("{minutes} minutes");
    }
    if minutes <= 89.0 {
        return "an hour".into();
    }

    let hours = (secs / 3600.0).round();
    if hours <= 21.0 {
        return format!("{hours} hours");
    }
    if hours <= 35.0 {
        return "a day".into();
    }

    let days = (secs / 86_400.0).round();
    if days <= 25.0 {
        return format!("{days} days");
    }
    if days <= 45.0 {
        return "a month".into();
    }

    let months = (days / AVG_DAYS_PER_MONTH).round();
    if months <= 10.0 {
        return format!("{months} months");
    }
    if months <= 17.0 {
        return "a year".into();
    }

    let years = (months / 12.0).round();
    format!("{years} years")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn ago(d: Duration) -> String {
        relative_time(now() - d, now())
    }

    #[test]
    fn seconds_and_minutes() {
        assert_eq!(ago(Duration::seconds(10)), "a few seconds ago");
        assert_eq!(ago(Duration::seconds(60)), "a minute ago");
        assert_eq!(ago(Duration::minutes(5)), "5 minutes ago");
    }

    #[test]
    fn hours_and_days() {
        assert_eq!(ago(Duration::minutes(60)), "an hour ago");
        assert_eq!(ago(Duration::hours(3)), "3 hours ago");
        assert_eq!(ago(Duration::hours(30)), "a day ago");
        assert_eq!(ago(Duration::days(4)), "4 days ago");
    }

    #[test]
    fn months_and_years() {
        assert_eq!(ago(Duration::days(30)), "a month ago");
        assert_eq!(ago(Duration::days(92)), "3 months ago");
        assert_eq!(ago(Duration::days(400)), "a year ago");
        assert_eq!(ago(Duration::days(1100)), "3 years ago");
    }

    #[test]
    fn future_instants_read_forward() {
        assert_eq!(relative_time(now() + Duration::hours(2), now()), "in 2 hours");
    }
}
