// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.
//!
//! Timestamps in API responses always use microsecond precision and a `Z`
//! suffix, so clients can sort them as strings.

use chrono::{DateTime, Datelike, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time in the API timestamp format.
pub fn now_rfc3339() -> String {
    format_utc_rfc3339(Utc::now())
}

/// Parse an RFC3339 timestamp into UTC.
pub fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Short relative label ("Just now", "5m ago", "3h ago", "12d ago"),
/// falling back to the calendar date after 30 days.
pub fn time_ago(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(date);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else if days < 30 {
        format!("{}d ago", days)
    } else {
        date.format("%b %-d, %Y").to_string()
    }
}

/// Month section title, e.g. "October 2026".
pub fn month_title(date: DateTime<Utc>) -> String {
    format!("{} {}", date.format("%B"), date.year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_stored_format_sorts_chronologically() {
        let a = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let b = a + Duration::milliseconds(500);
        assert!(format_utc_rfc3339(a) < format_utc_rfc3339(b));
        assert!(format_utc_rfc3339(a).ends_with('Z'));
    }

    #[test]
    fn test_time_ago_buckets() {
        let now = DateTime::from_timestamp(1_800_000_000, 0).unwrap();
        assert_eq!(time_ago(now - Duration::seconds(20), now), "Just now");
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(time_ago(now - Duration::hours(3), now), "3h ago");
        assert_eq!(time_ago(now - Duration::days(12), now), "12d ago");

        let old = DateTime::parse_from_rfc3339("2020-03-07T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(time_ago(old, now), "Mar 7, 2020");
    }

    #[test]
    fn test_month_title() {
        let date = parse_utc("2026-10-16T08:00:00.000000Z").unwrap();
        assert_eq!(month_title(date), "October 2026");
    }
}
