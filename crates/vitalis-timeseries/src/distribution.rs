//! Vitalis Time Series Distribution
//!
//! Converts interval-stamped records into minute-level samples by splitting
//! each record's fields across the minutes it overlaps, in proportion to
//! the overlap. Point measurements can instead be wrapped directly.
//!
//! @version 0.1.0
//! @author Vitalis Development Team

use crate::calendar::{bucket_start, next_bucket};
use crate::records::{Fields, IntervalRecord};
use crate::types::{Channels, SeriesValues, TemporalDataSet};
use chrono::{DateTime, Duration, Utc};
use indexmap::{IndexMap, IndexSet};
use std::collections::BTreeMap;
use vitalis_common::TimeUnit;

// =============================================================================
// Interval Distributor
// =============================================================================

/// Accumulates proportional per-minute contributions from interval records.
#[derive(Debug, Default)]
pub struct IntervalDistributor {
    fields: IndexMap<String, usize>,
    minutes: BTreeMap<DateTime<Utc>, Vec<f64>>,
    records: usize,
    skipped: usize,
}

impl IntervalDistributor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record's fields to the minutes it overlaps.
    pub fn add<R: IntervalRecord + ?Sized>(&mut self, record: &R) {
        let start = record.start_time();
        let end = record.end_time();
        let fields = record.fields();
        self.records += 1;

        if fields.is_empty() {
            self.skipped += 1;
            return;
        }

        let start_minute = bucket_start(start, TimeUnit::Minute);
        let end_minute = bucket_start(end, TimeUnit::Minute);

        if start_minute == end_minute {
            if end < start {
                tracing::warn!("Skipping record ending before it starts at {}", start);
                self.skipped += 1;
                return;
            }
            for (name, value) in &fields {
                self.accumulate(start_minute, name, *value);
            }
            return;
        }

        let total = seconds(end - start);
        if total <= 0.0 {
            tracing::warn!("Skipping record ending before it starts at {}", start);
            self.skipped += 1;
            return;
        }

        let mut minute = start_minute;
        while minute <= end_minute {
            let Some(window_end) = next_bucket(minute, TimeUnit::Minute) else {
                break;
            };
            let overlap = end.min(window_end) - start.max(minute);
            if overlap > Duration::zero() {
                let proportion = seconds(overlap) / total;
                for (name, value) in &fields {
                    self.accumulate(minute, name, value * proportion);
                }
            }
            minute = window_end;
        }
    }

    fn accumulate(&mut self, minute: DateTime<Utc>, field: &str, amount: f64) {
        let next_index = self.fields.len();
        let index = *self.fields.entry(field.to_string()).or_insert(next_index);
        let slot = self.minutes.entry(minute).or_default();
        if slot.len() <= index {
            slot.resize(index + 1, 0.0);
        }
        slot[index] += amount;
    }

    /// Number of records seen, including skipped ones.
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Number of records that contributed nothing.
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }

    /// Build the minute-level data set.
    ///
    /// A single field name yields a single-channel set; several yield one
    /// channel per field, zero where a minute saw no contribution.
    pub fn finish(self) -> TemporalDataSet {
        let field_count = self.fields.len();
        if field_count == 0 {
            return TemporalDataSet::empty(TimeUnit::Minute);
        }

        let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(self.minutes.len()); field_count];
        let mut timestamps = Vec::with_capacity(self.minutes.len());
        for (minute, slot) in self.minutes {
            timestamps.push(minute);
            for (index, column) in columns.iter_mut().enumerate() {
                column.push(slot.get(index).copied().unwrap_or(0.0));
            }
        }

        tracing::debug!(
            "Distributed {} records into {} minutes across {} fields",
            self.records,
            timestamps.len(),
            field_count
        );

        let values = if field_count == 1 {
            SeriesValues::Single(columns.into_iter().next().unwrap_or_default())
        } else {
            SeriesValues::Channels(self.fields.into_keys().zip(columns).collect())
        };
        TemporalDataSet::from_aligned(timestamps, values, TimeUnit::Minute)
    }
}

/// Distribute interval records into a minute-level data set.
pub fn distribute<R: IntervalRecord>(records: &[R]) -> TemporalDataSet {
    let mut distributor = IntervalDistributor::new();
    for record in records {
        distributor.add(record);
    }
    distributor.finish()
}

fn seconds(duration: Duration) -> f64 {
    match duration.num_nanoseconds() {
        Some(nanos) => nanos as f64 / 1e9,
        None => duration.num_milliseconds() as f64 / 1e3,
    }
}

// =============================================================================
// Point Wrapping
// =============================================================================

/// Wrap point measurements as a minute-level data set without summing.
///
/// Each reading keeps its own entry at its start minute; readings are
/// sorted stably by time. Fields missing from a reading become zero.
pub fn wrap_points<R: IntervalRecord>(records: &[R]) -> TemporalDataSet {
    let mut readings: Vec<(DateTime<Utc>, Fields)> = records
        .iter()
        .map(|r| (bucket_start(r.start_time(), TimeUnit::Minute), r.fields()))
        .filter(|(_, fields)| !fields.is_empty())
        .collect();
    readings.sort_by_key(|(time, _)| *time);

    let names: IndexSet<String> = readings
        .iter()
        .flat_map(|(_, fields)| fields.keys().cloned())
        .collect();
    if names.is_empty() {
        return TemporalDataSet::empty(TimeUnit::Minute);
    }

    let timestamps: Vec<DateTime<Utc>> = readings.iter().map(|(time, _)| *time).collect();
    let column = |name: &str| -> Vec<f64> {
        readings
            .iter()
            .map(|(_, fields)| fields.get(name).copied().unwrap_or(0.0))
            .collect()
    };

    let values = if names.len() == 1 {
        let name = names.first().map(String::as_str).unwrap_or_default();
        SeriesValues::Single(column(name))
    } else {
        let channels: Channels = names.iter().map(|name| (name.clone(), column(name))).collect();
        SeriesValues::Channels(channels)
    };
    TemporalDataSet::from_aligned(timestamps, values, TimeUnit::Minute)
}

impl TemporalDataSet {
    /// See [`wrap_points`].
    pub fn from_point_records<R: IntervalRecord>(records: &[R]) -> Self {
        wrap_points(records)
    }
}

// =============================================================================
// Tests
// =============================================================================
