//! Vitalis Time Series Gap Filling
//!
//! Produces the dense, chart-ready form of a bucketed data set: every
//! bucket between the first and last one is present, missing buckets are
//! zero in every channel.
//!
//! @version 0.1.0
//! @author Vitalis Development Team

use crate::calendar::{bucket_start, buckets_between};
use crate::types::TemporalDataSet;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Fill every missing bucket between the data's first and last timestamp.
///
/// Empty input is returned unchanged.
pub fn fill_gaps(data: &TemporalDataSet) -> TemporalDataSet {
    match data.time_range() {
        Some((first, last)) => fill_between(data, first, last),
        None => data.clone(),
    }
}

/// Fill every bucket of the window `[start, end]`, widened to cover the
/// data if any of it lies outside the window.
pub fn fill_gaps_in_range(
    data: &TemporalDataSet,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> TemporalDataSet {
    let (first, last) = match data.time_range() {
        Some((first, last)) => (first.min(start), last.max(end)),
        None => (start, end),
    };
    fill_between(data, first, last)
}

fn fill_between(data: &TemporalDataSet, first: DateTime<Utc>, last: DateTime<Utc>) -> TemporalDataSet {
    let unit = data.unit();

    // Re-normalize existing keys; on collision the later row wins.
    let rows: HashMap<DateTime<Utc>, usize> = data
        .timestamps()
        .iter()
        .enumerate()
        .map(|(row, timestamp)| (bucket_start(*timestamp, unit), row))
        .collect();

    let timestamps: Vec<DateTime<Utc>> = buckets_between(first, last, unit).collect();
    let columns = data
        .values()
        .columns()
        .into_iter()
        .map(|column| {
            timestamps
                .iter()
                .map(|bucket| rows.get(bucket).map(|row| column[*row]).unwrap_or(0.0))
                .collect()
        })
        .collect();

    tracing::debug!(
        "Filled {} {} buckets from {} existing",
        timestamps.len(),
        unit,
        data.len()
    );

    TemporalDataSet::from_aligned(timestamps, data.values().with_columns(columns), unit)
}

// =============================================================================
// Tests
// =============================================================================
