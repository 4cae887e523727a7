//! Vitalis Time Series Aggregation
//!
//! The bucketing engine: re-buckets a data set into a target time unit
//! under one of the aggregation semantics.
//!
//! @version 0.1.0
//! @author Vitalis Development Team

use crate::calendar::{bucket_start, buckets_between};
use crate::types::{Channels, SeriesValues, TemporalDataSet};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use vitalis_common::{AggregationType, Result, TimeUnit, VitalisError};

/// Channel names produced by [`AggregationType::MinMax`].
pub const MIN_CHANNEL: &str = "min";
pub const MAX_CHANNEL: &str = "max";

// =============================================================================
// Bucketer
// =============================================================================

/// Re-buckets data sets into `target` units using `kind` semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucketer {
    target: TimeUnit,
    kind: AggregationType,
}

impl Bucketer {
    pub fn new(target: TimeUnit, kind: AggregationType) -> Self {
        Self { target, kind }
    }

    pub fn target(&self) -> TimeUnit {
        self.target
    }

    pub fn kind(&self) -> AggregationType {
        self.kind
    }

    /// Check the preconditions of this aggregation against `data`.
    pub fn validate(&self, data: &TemporalDataSet) -> Result<()> {
        match self.kind {
            AggregationType::DailyAverage if !TimeUnit::Day.is_smaller_or_equal(self.target) => {
                Err(VitalisError::UnsupportedAggregation(format!(
                    "daily_average needs a target of at least a day, got {}",
                    self.target
                )))
            }
            AggregationType::DurationSum if data.unit() != TimeUnit::Minute => {
                Err(VitalisError::UnsupportedAggregation(format!(
                    "duration_sum needs minute samples, got {} data",
                    data.unit()
                )))
            }
            AggregationType::MinMax if data.is_multi_channel() => {
                Err(VitalisError::UnsupportedAggregation(format!(
                    "min_max needs a single channel, got {} channels",
                    data.values().channel_count()
                )))
            }
            _ => Ok(()),
        }
    }

    /// Aggregate `data` into a new data set at the target unit.
    pub fn apply(&self, data: &TemporalDataSet) -> Result<TemporalDataSet> {
        self.validate(data)?;

        if self.kind == AggregationType::Sum && is_bucketed(data, self.target) {
            return Ok(data.clone());
        }

        let result = match self.kind {
            AggregationType::Sum => fold_buckets(data, self.target, |values| values.iter().sum()),
            AggregationType::DurationSum => fold_buckets(data, self.target, |values| values.len() as f64),
            AggregationType::MinMax => min_max(data, self.target),
            AggregationType::DailyAverage => daily_average(data, self.target),
        };

        tracing::debug!(
            "Aggregated {} {} samples into {} {} buckets ({})",
            data.len(),
            data.unit(),
            result.len(),
            self.target,
            self.kind
        );
        Ok(result)
    }
}

/// Aggregate `data` into `target` buckets using `kind` semantics.
pub fn aggregate(
    data: &TemporalDataSet,
    target: TimeUnit,
    kind: AggregationType,
) -> Result<TemporalDataSet> {
    Bucketer::new(target, kind).apply(data)
}

// =============================================================================
// Grouping
// =============================================================================

/// Values of one column keyed by the start of their bucket.
fn group(
    timestamps: &[DateTime<Utc>],
    column: &[f64],
    unit: TimeUnit,
) -> BTreeMap<DateTime<Utc>, Vec<f64>> {
    let mut buckets: BTreeMap<DateTime<Utc>, Vec<f64>> = BTreeMap::new();
    for (timestamp, value) in timestamps.iter().zip(column) {
        buckets
            .entry(bucket_start(*timestamp, unit))
            .or_default()
            .push(*value);
    }
    buckets
}

/// True when every timestamp is already a distinct `unit` bucket key in
/// ascending order, so SUM has nothing to merge.
fn is_bucketed(data: &TemporalDataSet, unit: TimeUnit) -> bool {
    data.unit() == unit
        && data.timestamps().windows(2).all(|pair| pair[0] < pair[1])
        && data
            .timestamps()
            .iter()
            .all(|timestamp| bucket_start(*timestamp, unit) == *timestamp)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Group every column and fold each bucket to one value.
///
/// Output timestamps come from the first column; other columns are
/// reconciled against them.
fn fold_buckets(
    data: &TemporalDataSet,
    unit: TimeUnit,
    fold: impl Fn(&[f64]) -> f64,
) -> TemporalDataSet {
    let grouped: Vec<_> = data
        .values()
        .columns()
        .into_iter()
        .map(|column| group(data.timestamps(), column, unit))
        .collect();

    let timestamps: Vec<DateTime<Utc>> = grouped
        .first()
        .map(|buckets| buckets.keys().copied().collect())
        .unwrap_or_default();

    let columns = grouped
        .iter()
        .map(|buckets| {
            timestamps
                .iter()
                .map(|t| buckets.get(t).map(|values| fold(values.as_slice())).unwrap_or(0.0))
                .collect()
        })
        .collect();

    TemporalDataSet::from_aligned(timestamps, data.values().with_columns(columns), unit)
}

// =============================================================================
// Min/Max
// =============================================================================

fn min_max(data: &TemporalDataSet, unit: TimeUnit) -> TemporalDataSet {
    let column = data.values().columns().into_iter().next().unwrap_or_default();
    let buckets = group(data.timestamps(), column, unit);

    let mut timestamps = Vec::with_capacity(buckets.len());
    let mut mins = Vec::with_capacity(buckets.len());
    let mut maxs = Vec::with_capacity(buckets.len());
    for (bucket, values) in buckets {
        timestamps.push(bucket);
        mins.push(values.iter().copied().fold(f64::INFINITY, f64::min));
        maxs.push(values.iter().copied().fold(f64::NEG_INFINITY, f64::max));
    }

    let mut channels = Channels::new();
    channels.insert(MIN_CHANNEL.to_string(), mins);
    channels.insert(MAX_CHANNEL.to_string(), maxs);
    TemporalDataSet::from_aligned(timestamps, SeriesValues::Channels(channels), unit)
}

// =============================================================================
// Daily Average
// =============================================================================

/// Average per calendar day, then average the days with data in each
/// target window. Windows without any day of data are zero.
fn daily_average(data: &TemporalDataSet, unit: TimeUnit) -> TemporalDataSet {
    let daily = fold_buckets(data, TimeUnit::Day, mean);
    if unit == TimeUnit::Day {
        return daily;
    }

    let Some((first_day, last_day)) = daily.time_range() else {
        let empty = data.values().columns().iter().map(|_| Vec::new()).collect();
        return TemporalDataSet::from_aligned(Vec::new(), data.values().with_columns(empty), unit);
    };

    let windows: Vec<DateTime<Utc>> = buckets_between(first_day, last_day, unit).collect();
    let columns = daily
        .values()
        .columns()
        .into_iter()
        .map(|column| {
            let by_window = group(daily.timestamps(), column, unit);
            windows
                .iter()
                .map(|window| by_window.get(window).map(|days| mean(days)).unwrap_or(0.0))
                .collect()
        })
        .collect();

    TemporalDataSet::from_aligned(windows, daily.values().with_columns(columns), unit)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .expect("failed to parse test timestamp")
            .with_timezone(&Utc)
    }

    fn minutes(start: &str, values: &[f64]) -> TemporalDataSet {
        let base = ts(start);
        let timestamps = (0..values.len() as i64).map(|i| base + Duration::minutes(i)).collect();
        TemporalDataSet::single(timestamps, values.to_vec(), TimeUnit::Minute)
            .expect("failed to build test data")
    }

    #[test]
    fn test_sum_to_hour() {
        let timestamps = vec![
            ts("2026-03-02T00:00:00Z"),
            ts("2026-03-02T00:01:00Z"),
            ts("2026-03-02T02:30:00Z"),
        ];
        let data = TemporalDataSet::single(timestamps, vec![60.0, 30.0, 10.0], TimeUnit::Minute).unwrap();

        let hourly = aggregate(&data, TimeUnit::Hour, AggregationType::Sum).unwrap();
        assert_eq!(hourly.unit(), TimeUnit::Hour);
        assert_eq!(
            hourly.timestamps(),
            &[ts("2026-03-02T00:00:00Z"), ts("2026-03-02T02:00:00Z")]
        );
        assert_eq!(hourly.single_values(), Some(&[90.0, 10.0][..]));
    }

    #[test]
    fn test_sum_identity_at_same_unit() {
        let data = minutes("2026-03-02T00:00:00Z", &[1.0, 2.0, 3.0]);
        let same = aggregate(&data, TimeUnit::Minute, AggregationType::Sum).unwrap();
        assert_eq!(same, data);
    }

    #[test]
    fn test_sum_merges_same_minute_readings() {
        let minute = ts("2026-03-02T08:00:00Z");
        let data = TemporalDataSet::single(vec![minute, minute], vec![120.0, 124.0], TimeUnit::Minute).unwrap();

        let summed = aggregate(&data, TimeUnit::Minute, AggregationType::Sum).unwrap();
        assert_eq!(summed.timestamps(), &[minute]);
        assert_eq!(summed.single_values(), Some(&[244.0][..]));
    }

    #[test]
    fn test_sum_normalizes_unaligned_keys_at_same_unit() {
        let data = TemporalDataSet::single(
            vec![ts("2026-03-02T08:15:00Z"), ts("2026-03-02T09:45:00Z")],
            vec![3.0, 4.0],
            TimeUnit::Hour,
        )
        .unwrap();

        let hourly = aggregate(&data, TimeUnit::Hour, AggregationType::Sum).unwrap();
        assert_eq!(
            hourly.timestamps(),
            &[ts("2026-03-02T08:00:00Z"), ts("2026-03-02T09:00:00Z")]
        );
        assert_eq!(hourly.single_values(), Some(&[3.0, 4.0][..]));
    }

    #[test]
    fn test_sum_multi_channel() {
        let mut channels = Channels::new();
        channels.insert("energy_kcal".to_string(), vec![100.0, 200.0, 300.0]);
        channels.insert("protein_grams".to_string(), vec![1.0, 2.0, 3.0]);
        let timestamps = vec![
            ts("2026-03-02T08:00:00Z"),
            ts("2026-03-02T19:00:00Z"),
            ts("2026-03-03T08:00:00Z"),
        ];
        let data = TemporalDataSet::multi(timestamps, channels, TimeUnit::Minute).unwrap();

        let daily = aggregate(&data, TimeUnit::Day, AggregationType::Sum).unwrap();
        assert_eq!(daily.channel_names(), vec!["energy_kcal", "protein_grams"]);
        assert_eq!(daily.channel("energy_kcal"), Some(&[300.0, 300.0][..]));
        assert_eq!(daily.channel("protein_grams"), Some(&[3.0, 3.0][..]));
    }

    #[test]
    fn test_duration_sum_counts_samples() {
        let data = minutes("2026-03-02T05:10:00Z", &[0.2, 7.0, 1.5, 100.0, 0.01]);
        let hourly = aggregate(&data, TimeUnit::Hour, AggregationType::DurationSum).unwrap();
        assert_eq!(hourly.single_values(), Some(&[5.0][..]));
    }

    #[test]
    fn test_duration_sum_requires_minutes() {
        let data = TemporalDataSet::single(vec![ts("2026-03-02T05:00:00Z")], vec![1.0], TimeUnit::Hour).unwrap();
        let err = aggregate(&data, TimeUnit::Day, AggregationType::DurationSum).unwrap_err();
        assert!(matches!(err, VitalisError::UnsupportedAggregation(_)));
    }

    #[test]
    fn test_min_max_shape() {
        let data = minutes("2026-03-02T05:58:00Z", &[72.0, 95.0, 60.0, 88.0]);
        let ranges = aggregate(&data, TimeUnit::Hour, AggregationType::MinMax).unwrap();
        assert_eq!(ranges.channel_names(), vec![MIN_CHANNEL, MAX_CHANNEL]);
        assert_eq!(ranges.channel(MIN_CHANNEL), Some(&[72.0, 60.0][..]));
        assert_eq!(ranges.channel(MAX_CHANNEL), Some(&[95.0, 88.0][..]));
    }

    #[test]
    fn test_min_max_rejects_multi_channel() {
        let mut channels = Channels::new();
        channels.insert("systolic".to_string(), vec![120.0]);
        channels.insert("diastolic".to_string(), vec![80.0]);
        let data = TemporalDataSet::multi(vec![ts("2026-03-02T08:00:00Z")], channels, TimeUnit::Minute).unwrap();
        let err = aggregate(&data, TimeUnit::Day, AggregationType::MinMax).unwrap_err();
        assert!(matches!(err, VitalisError::UnsupportedAggregation(_)));
    }

    #[test]
    fn test_daily_average_rejects_fine_target() {
        let data = minutes("2026-03-02T05:00:00Z", &[1.0]);
        let err = aggregate(&data, TimeUnit::Hour, AggregationType::DailyAverage).unwrap_err();
        assert!(matches!(err, VitalisError::UnsupportedAggregation(_)));
    }

    #[test]
    fn test_daily_average_to_day() {
        let timestamps = vec![
            ts("2026-03-02T08:00:00Z"),
            ts("2026-03-02T20:00:00Z"),
            ts("2026-03-04T08:00:00Z"),
        ];
        let data = TemporalDataSet::single(timestamps, vec![120.0, 130.0, 110.0], TimeUnit::Minute).unwrap();
        let daily = aggregate(&data, TimeUnit::Day, AggregationType::DailyAverage).unwrap();
        assert_eq!(
            daily.timestamps(),
            &[ts("2026-03-02T00:00:00Z"), ts("2026-03-04T00:00:00Z")]
        );
        assert_eq!(daily.single_values(), Some(&[125.0, 110.0][..]));

        let again = aggregate(&daily, TimeUnit::Day, AggregationType::DailyAverage).unwrap();
        assert_eq!(again, daily);
    }

    #[test]
    fn test_daily_average_divides_by_days_with_data() {
        // Mon, Wed, Fri of the week starting Sunday 2026-03-01
        let timestamps = vec![
            ts("2026-03-02T08:00:00Z"),
            ts("2026-03-02T20:00:00Z"),
            ts("2026-03-04T08:00:00Z"),
            ts("2026-03-06T08:00:00Z"),
        ];
        let data = TemporalDataSet::single(timestamps, vec![120.0, 130.0, 110.0, 140.0], TimeUnit::Minute).unwrap();
        let weekly = aggregate(&data, TimeUnit::Week, AggregationType::DailyAverage).unwrap();
        assert_eq!(weekly.timestamps(), &[ts("2026-03-01T00:00:00Z")]);
        // (125 + 110 + 140) / 3
        assert_eq!(weekly.single_values(), Some(&[125.0][..]));
    }

    #[test]
    fn test_daily_average_fills_empty_windows() {
        let timestamps = vec![ts("2026-01-15T08:00:00Z"), ts("2026-03-10T08:00:00Z")];
        let data = TemporalDataSet::single(timestamps, vec![70.0, 90.0], TimeUnit::Minute).unwrap();
        let monthly = aggregate(&data, TimeUnit::Month, AggregationType::DailyAverage).unwrap();
        assert_eq!(
            monthly.timestamps(),
            &[
                ts("2026-01-01T00:00:00Z"),
                ts("2026-02-01T00:00:00Z"),
                ts("2026-03-01T00:00:00Z"),
            ]
        );
        assert_eq!(monthly.single_values(), Some(&[70.0, 0.0, 90.0][..]));
    }

    #[test]
    fn test_daily_average_empty_keeps_channels() {
        let mut channels = Channels::new();
        channels.insert("systolic".to_string(), Vec::new());
        channels.insert("diastolic".to_string(), Vec::new());
        let data = TemporalDataSet::multi(Vec::new(), channels, TimeUnit::Minute).unwrap();
        let weekly = aggregate(&data, TimeUnit::Week, AggregationType::DailyAverage).unwrap();
        assert!(weekly.is_empty());
        assert_eq!(weekly.channel_names(), vec!["systolic", "diastolic"]);
        assert_eq!(weekly.unit(), TimeUnit::Week);
    }
}
