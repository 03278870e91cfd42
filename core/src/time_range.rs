//! Human-readable recency buckets for chat timestamps.
//!
//! The listing endpoints attach a `time_range` label derived from each chat's
//! `updated_at`. The labelling policy belongs to the caller, so it sits
//! behind `TimeRangeLabeler`; `CalendarTimeRange` is the stock policy.

use std::fmt;

use chrono::{DateTime, Datelike, Local, TimeZone};

pub trait TimeRangeLabeler: Send + Sync {
    /// Label for a Unix timestamp in seconds.
    fn label(&self, timestamp: i64) -> String;
}

impl<F> TimeRangeLabeler for F
where
    F: Fn(i64) -> String + Send + Sync,
{
    fn label(&self, timestamp: i64) -> String {
        self(timestamp)
    }
}

/// `Today`, `Yesterday`, `Previous 7 days`, `Previous 30 days`, then the month
/// name within the current year and the bare year before that. Calendar
/// comparisons use the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarTimeRange;

impl TimeRangeLabeler for CalendarTimeRange {
    fn label(&self, timestamp: i64) -> String {
        label_at(&Local::now(), timestamp)
    }
}

/// Bucket `timestamp` relative to `now`.
pub fn label_at<Tz: TimeZone>(now: &DateTime<Tz>, timestamp: i64) -> String
where
    Tz::Offset: fmt::Display,
{
    let Some(date) = DateTime::from_timestamp(timestamp, 0) else {
        return String::new();
    };
    let date = date.with_timezone(&now.timezone());

    let same_month = now.year() == date.year() && now.month() == date.month();
    let diff_days = (now.timestamp() - timestamp) as f64 / 86_400.0;

    if same_month && now.day() == date.day() {
        "Today".to_string()
    } else if same_month && now.day() as i64 - date.day() as i64 == 1 {
        "Yesterday".to_string()
    } else if diff_days <= 7.0 {
        "Previous 7 days".to_string()
    } else if diff_days <= 30.0 {
        "Previous 30 days".to_string()
    } else if now.year() == date.year() {
        date.format("%B").to_string()
    } else {
        date.year().to_string()
    }
}
