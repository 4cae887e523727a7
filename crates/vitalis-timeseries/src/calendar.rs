//! Vitalis Time Series Calendar
//!
//! Bucket normalization and stepping shared by the bucketing engine, the
//! gap filler, and label generation. All calendar arithmetic is UTC.
//!
//! @version 0.1.0
//! @author Vitalis Development Team

use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use vitalis_common::TimeUnit;

// =============================================================================
// Normalization
// =============================================================================

/// Start of the bucket containing `timestamp` at `unit` granularity.
///
/// Weeks start on the most recent Sunday at or before the timestamp, months
/// on day 1, years on January 1.
pub fn bucket_start(timestamp: DateTime<Utc>, unit: TimeUnit) -> DateTime<Utc> {
    let date = timestamp.date_naive();
    match unit {
        TimeUnit::Minute => timestamp
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(timestamp),
        TimeUnit::Hour => timestamp
            .with_minute(0)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(timestamp),
        TimeUnit::Day => start_of_day(date),
        TimeUnit::Week => {
            let back = u64::from(date.weekday().num_days_from_sunday());
            date.checked_sub_days(Days::new(back))
                .map(start_of_day)
                .unwrap_or(timestamp)
        }
        TimeUnit::Month => date.with_day(1).map(start_of_day).unwrap_or(timestamp),
        TimeUnit::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)
            .map(start_of_day)
            .unwrap_or(timestamp),
    }
}

/// Start of the bucket following the one starting at `bucket`.
///
/// Months and years step by calendar, not by a fixed duration. Returns
/// `None` past the representable range.
pub fn next_bucket(bucket: DateTime<Utc>, unit: TimeUnit) -> Option<DateTime<Utc>> {
    match unit {
        TimeUnit::Minute => bucket.checked_add_signed(Duration::minutes(1)),
        TimeUnit::Hour => bucket.checked_add_signed(Duration::hours(1)),
        TimeUnit::Day => bucket.checked_add_signed(Duration::days(1)),
        TimeUnit::Week => bucket.checked_add_signed(Duration::weeks(1)),
        TimeUnit::Month => bucket.checked_add_months(Months::new(1)),
        TimeUnit::Year => bucket.checked_add_months(Months::new(12)),
    }
}

/// Midnight UTC of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

// =============================================================================
// Bucket Range
// =============================================================================

/// Iterator over consecutive bucket starts, both ends inclusive.
#[derive(Debug, Clone)]
pub struct BucketRange {
    next: Option<DateTime<Utc>>,
    end: DateTime<Utc>,
    unit: TimeUnit,
}

impl Iterator for BucketRange {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|t| *t <= self.end)?;
        self.next = next_bucket(current, self.unit);
        Some(current)
    }
}

/// Every bucket start from the bucket containing `start` through the bucket
/// containing `end`.
pub fn buckets_between(start: DateTime<Utc>, end: DateTime<Utc>, unit: TimeUnit) -> BucketRange {
    BucketRange {
        next: Some(bucket_start(start, unit)),
        end: bucket_start(end, unit),
        unit,
    }
}

// =============================================================================
// Tests
// =============================================================================
