//! Vitalis Time Series Marks
//!
//! Converts data sets into ordered, labeled plot records. Labels are a pure
//! function of the bucket timestamp and unit; only their information
//! content is fixed, not locale formatting.
//!
//! @version 0.1.0
//! @author Vitalis Development Team

use crate::aggregation::{MAX_CHANNEL, MIN_CHANNEL};
use crate::calendar::bucket_start;
use crate::types::{SeriesValues, TemporalDataSet};
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use vitalis_common::{Result, TimeUnit, VitalisError};

// =============================================================================
// Mark Types
// =============================================================================

/// A single plot point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub index: f64,
    pub value: f64,
    pub label: String,
}

impl Mark {
    pub fn new(index: f64, value: f64, label: impl Into<String>) -> Self {
        Self {
            index,
            value,
            label: label.into(),
        }
    }
}

/// A min/max pair sharing one position and label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeMark {
    pub min_point: Mark,
    pub max_point: Mark,
}

impl RangeMark {
    pub fn index(&self) -> f64 {
        self.min_point.index
    }

    pub fn label(&self) -> &str {
        &self.min_point.label
    }

    pub fn spread(&self) -> f64 {
        self.max_point.value - self.min_point.value
    }
}

// =============================================================================
// Labels
// =============================================================================

/// Label for the bucket containing `timestamp`.
///
/// Minute: "9:05", hour: "9", day: "3/2 Mon", week: "Mar W1",
/// month: "2026-03", year: "2026".
pub fn generate_label(timestamp: DateTime<Utc>, unit: TimeUnit) -> String {
    let bucket = bucket_start(timestamp, unit);
    match unit {
        TimeUnit::Minute => bucket.format("%-H:%M").to_string(),
        TimeUnit::Hour => bucket.format("%-H").to_string(),
        TimeUnit::Day => bucket.format("%-m/%-d %a").to_string(),
        TimeUnit::Week => format!(
            "{} W{}",
            bucket.format("%b"),
            week_of_month(bucket.date_naive())
        ),
        TimeUnit::Month => bucket.format("%Y-%m").to_string(),
        TimeUnit::Year => bucket.format("%Y").to_string(),
    }
}

/// 1-based ordinal of the week starting `week_start` within its month.
///
/// Weeks are counted from the first Sunday on or after the 1st.
pub fn week_of_month(week_start: NaiveDate) -> u32 {
    let Some(first) = week_start.with_day(1) else {
        return 1;
    };
    let to_sunday = (7 - first.weekday().num_days_from_sunday()) % 7;
    let anchor = first
        .checked_add_days(Days::new(u64::from(to_sunday)))
        .unwrap_or(first);
    debug_assert_eq!(anchor.weekday(), Weekday::Sun);
    let days = (week_start - anchor).num_days().max(0);
    (days / 7) as u32 + 1
}

/// Labels for every timestamp of `data`.
pub fn labels(data: &TemporalDataSet) -> Vec<String> {
    data.timestamps()
        .iter()
        .map(|timestamp| generate_label(*timestamp, data.unit()))
        .collect()
}

// =============================================================================
// Conversion
// =============================================================================

fn build_marks(column: &[f64], labels: &[String]) -> Vec<Mark> {
    column
        .iter()
        .zip(labels)
        .enumerate()
        .map(|(index, (value, label))| Mark::new(index as f64, *value, label.clone()))
        .collect()
}

/// Marks of a single-channel data set.
pub fn to_marks(data: &TemporalDataSet) -> Result<Vec<Mark>> {
    match data.values() {
        SeriesValues::Single(values) => Ok(build_marks(values, &labels(data))),
        SeriesValues::Channels(channels) => Err(VitalisError::InvalidChannelSelection(format!(
            "data set has {} channels; select one by name",
            channels.len()
        ))),
    }
}

/// Marks of one named channel.
pub fn channel_marks(data: &TemporalDataSet, name: &str) -> Result<Vec<Mark>> {
    let column = data
        .channel(name)
        .ok_or_else(|| VitalisError::MissingChannel(name.to_string()))?;
    Ok(build_marks(column, &labels(data)))
}

/// Marks of every channel, keyed by channel name, sharing one label set.
pub fn all_channel_marks(data: &TemporalDataSet) -> Result<IndexMap<String, Vec<Mark>>> {
    let SeriesValues::Channels(channels) = data.values() else {
        return Err(VitalisError::InvalidChannelSelection(
            "single-channel data set has no named channels".to_string(),
        ));
    };
    let labels = labels(data);
    Ok(channels
        .iter()
        .map(|(name, column)| (name.clone(), build_marks(column, &labels)))
        .collect())
}

/// Range marks pairing the "min" and "max" channels index by index.
pub fn range_marks(data: &TemporalDataSet) -> Result<Vec<RangeMark>> {
    let mins = channel_marks(data, MIN_CHANNEL)?;
    let maxs = channel_marks(data, MAX_CHANNEL)?;
    Ok(mins
        .into_iter()
        .zip(maxs)
        .map(|(min_point, max_point)| RangeMark {
            min_point,
            max_point,
        })
        .collect())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Channels;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .expect("failed to parse test timestamp")
            .with_timezone(&Utc)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("failed to parse test date")
    }

    #[test]
    fn test_labels_per_unit() {
        let t = ts("2026-03-02T09:05:30Z");
        assert_eq!(generate_label(t, TimeUnit::Minute), "9:05");
        assert_eq!(generate_label(t, TimeUnit::Hour), "9");
        assert_eq!(generate_label(t, TimeUnit::Day), "3/2 Mon");
        assert_eq!(generate_label(t, TimeUnit::Week), "Mar W1");
        assert_eq!(generate_label(t, TimeUnit::Month), "2026-03");
        assert_eq!(generate_label(t, TimeUnit::Year), "2026");
    }

    #[test]
    fn test_week_of_month_anchor() {
        // March 2026 starts on a Sunday
        assert_eq!(week_of_month(date("2026-03-01")), 1);
        assert_eq!(week_of_month(date("2026-03-08")), 2);
        assert_eq!(week_of_month(date("2026-03-29")), 5);
        // January 2026 starts on a Thursday; first Sunday is the 4th
        assert_eq!(week_of_month(date("2026-01-04")), 1);
        assert_eq!(week_of_month(date("2026-01-25")), 4);
    }

    #[test]
    fn test_week_label_uses_bucket_month() {
        // Thursday 2026-01-01 belongs to the week starting Sunday 2025-12-28
        assert_eq!(generate_label(ts("2026-01-01T12:00:00Z"), TimeUnit::Week), "Dec W4");
    }

    #[test]
    fn test_single_channel_marks() {
        let data = TemporalDataSet::single(
            vec![ts("2026-03-02T00:00:00Z"), ts("2026-03-02T01:00:00Z")],
            vec![90.0, 0.0],
            TimeUnit::Hour,
        )
        .unwrap();
        let marks = to_marks(&data).unwrap();
        assert_eq!(marks, vec![Mark::new(0.0, 90.0, "0"), Mark::new(1.0, 0.0, "1")]);
    }

    fn blood_pressure() -> TemporalDataSet {
        let mut channels = Channels::new();
        channels.insert("systolic".to_string(), vec![120.0, 125.0]);
        channels.insert("diastolic".to_string(), vec![80.0, 82.0]);
        TemporalDataSet::multi(
            vec![ts("2026-03-02T00:00:00Z"), ts("2026-03-03T00:00:00Z")],
            channels,
            TimeUnit::Day,
        )
        .unwrap()
    }

    #[test]
    fn test_channel_selection() {
        let data = blood_pressure();
        assert!(matches!(
            to_marks(&data),
            Err(VitalisError::InvalidChannelSelection(_))
        ));

        let systolic = channel_marks(&data, "systolic").unwrap();
        assert_eq!(systolic[1], Mark::new(1.0, 125.0, "3/3 Tue"));

        assert!(matches!(
            channel_marks(&data, "pulse"),
            Err(VitalisError::MissingChannel(_))
        ));
    }

    #[test]
    fn test_all_channel_marks_share_labels() {
        let all = all_channel_marks(&blood_pressure()).unwrap();
        let names: Vec<&str> = all.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["systolic", "diastolic"]);
        assert_eq!(all["systolic"][0].label, all["diastolic"][0].label);
        assert_eq!(all["diastolic"][0].value, 80.0);
    }

    #[test]
    fn test_range_marks() {
        let mut channels = Channels::new();
        channels.insert(MIN_CHANNEL.to_string(), vec![58.0]);
        channels.insert(MAX_CHANNEL.to_string(), vec![131.0]);
        let data = TemporalDataSet::multi(vec![ts("2026-03-02T07:00:00Z")], channels, TimeUnit::Hour).unwrap();

        let ranges = range_marks(&data).unwrap();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].index(), 0.0);
        assert_eq!(ranges[0].label(), "7");
        assert_eq!(ranges[0].spread(), 73.0);

        assert!(matches!(
            range_marks(&blood_pressure()),
            Err(VitalisError::MissingChannel(_))
        ));
    }
}
