//! Vitalis Time Series Pipeline
//!
//! Runs the full chart pipeline for one configuration: distribute raw
//! records to minutes, bucket, fill gaps, and convert to marks.
//!
//! @version 0.1.0
//! @author Vitalis Development Team

use crate::aggregation::Bucketer;
use crate::distribution::{wrap_points, IntervalDistributor};
use crate::gapfill::{fill_gaps, fill_gaps_in_range};
use crate::marks::{all_channel_marks, channel_marks, range_marks, to_marks, Mark, RangeMark};
use crate::records::IntervalRecord;
use crate::types::TemporalDataSet;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use vitalis_common::{AggregationType, ChartConfig, Result};

// =============================================================================
// Chart Output
// =============================================================================

/// Plot records produced by a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "marks", rename_all = "snake_case")]
pub enum ChartOutput {
    Marks(Vec<Mark>),
    Channels(IndexMap<String, Vec<Mark>>),
    Ranges(Vec<RangeMark>),
}

impl ChartOutput {
    /// Number of plotted positions.
    pub fn len(&self) -> usize {
        match self {
            Self::Marks(marks) => marks.len(),
            Self::Channels(channels) => channels.values().map(Vec::len).max().unwrap_or(0),
            Self::Ranges(ranges) => ranges.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Counters describing a pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineStats {
    pub records_in: usize,
    pub records_skipped: usize,
    pub samples: usize,
    pub buckets: usize,
    pub marks: usize,
    pub elapsed_micros: u64,
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct ChartResult {
    pub output: ChartOutput,
    /// The bucketed (and, if configured, gap-filled) series behind `output`.
    pub data: TemporalDataSet,
    pub stats: PipelineStats,
}

// =============================================================================
// Chart Pipeline
// =============================================================================

/// Executes one chart configuration over raw records.
#[derive(Debug, Clone)]
pub struct ChartPipeline {
    config: ChartConfig,
    window: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl ChartPipeline {
    pub fn new(config: ChartConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            window: None,
        })
    }

    /// Fill gaps across `[start, end]` instead of only the data's own span.
    pub fn with_window(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.window = Some((start, end));
        self
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Run over interval records, splitting them across minutes.
    pub fn run_intervals<R: IntervalRecord>(&self, records: &[R]) -> Result<ChartResult> {
        let started = Instant::now();
        let mut distributor = IntervalDistributor::new();
        for record in records {
            distributor.add(record);
        }
        let stats = PipelineStats {
            records_in: distributor.record_count(),
            records_skipped: distributor.skipped_count(),
            ..Default::default()
        };
        self.finish(distributor.finish(), stats, started)
    }

    /// Run over point measurements, one sample per reading.
    pub fn run_points<R: IntervalRecord>(&self, records: &[R]) -> Result<ChartResult> {
        let started = Instant::now();
        let samples = wrap_points(records);
        let stats = PipelineStats {
            records_in: records.len(),
            records_skipped: records.len().saturating_sub(samples.len()),
            ..Default::default()
        };
        self.finish(samples, stats, started)
    }

    /// Run over an existing data set.
    pub fn run(&self, data: &TemporalDataSet) -> Result<ChartResult> {
        let stats = PipelineStats {
            records_in: data.len(),
            ..Default::default()
        };
        self.finish(data.clone(), stats, Instant::now())
    }

    fn finish(
        &self,
        samples: TemporalDataSet,
        mut stats: PipelineStats,
        started: Instant,
    ) -> Result<ChartResult> {
        stats.samples = samples.len();

        let bucketer = Bucketer::new(self.config.target_unit, self.config.aggregation);
        let bucketed = bucketer.apply(&samples)?;
        let data = match (self.config.fill_gaps, self.window) {
            (true, Some((start, end))) => fill_gaps_in_range(&bucketed, start, end),
            (true, None) => fill_gaps(&bucketed),
            (false, _) => bucketed,
        };
        stats.buckets = data.len();

        let output = self.convert(&data)?;
        stats.marks = output.len();
        stats.elapsed_micros = started.elapsed().as_micros() as u64;

        tracing::debug!(
            "Chart pipeline produced {} marks from {} records ({} skipped) in {}us",
            stats.marks,
            stats.records_in,
            stats.records_skipped,
            stats.elapsed_micros
        );

        Ok(ChartResult {
            output,
            data,
            stats,
        })
    }

    fn convert(&self, data: &TemporalDataSet) -> Result<ChartOutput> {
        if self.config.aggregation == AggregationType::MinMax {
            return Ok(ChartOutput::Ranges(range_marks(data)?));
        }

        match (&self.config.channel, data.is_multi_channel()) {
            (Some(name), true) => Ok(ChartOutput::Marks(channel_marks(data, name)?)),
            (None, true) => Ok(ChartOutput::Channels(all_channel_marks(data)?)),
            (Some(name), false) => {
                tracing::debug!("Series has a single channel; plotting it for '{}'", name);
                Ok(ChartOutput::Marks(to_marks(data)?))
            }
            (None, false) => Ok(ChartOutput::Marks(to_marks(data)?)),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{BloodPressureRecord, HeartRateSample, SleepSessionRecord, StepsRecord};
    use vitalis_common::{TimeUnit, VitalisError};

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .expect("failed to parse test timestamp")
            .with_timezone(&Utc)
    }

    #[test]
    fn test_steps_pipeline() {
        let records = vec![
            StepsRecord::new(ts("2026-03-02T00:00:00Z"), ts("2026-03-02T00:02:00Z"), 60),
            StepsRecord::new(ts("2026-03-02T02:30:00Z"), ts("2026-03-02T02:31:00Z"), 10),
        ];
        let pipeline = ChartPipeline::new(ChartConfig::steps()).unwrap();
        let result = pipeline.run_intervals(&records).unwrap();

        assert_eq!(
            result.output,
            ChartOutput::Marks(vec![
                Mark::new(0.0, 60.0, "0"),
                Mark::new(1.0, 0.0, "1"),
                Mark::new(2.0, 10.0, "2"),
            ])
        );
        assert_eq!(result.stats.records_in, 2);
        assert_eq!(result.stats.samples, 3);
        assert_eq!(result.stats.buckets, 3);
        assert_eq!(result.stats.marks, 3);
    }

    #[test]
    fn test_heart_rate_ranges() {
        let samples = vec![
            HeartRateSample::new(ts("2026-03-02T07:10:00Z"), 64.0),
            HeartRateSample::new(ts("2026-03-02T07:40:00Z"), 118.0),
            HeartRateSample::new(ts("2026-03-02T09:05:00Z"), 71.0),
        ];
        let pipeline = ChartPipeline::new(ChartConfig::heart_rate()).unwrap();
        let result = pipeline.run_points(&samples).unwrap();

        let ChartOutput::Ranges(ranges) = result.output else {
            panic!("expected range marks");
        };
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0].min_point.value, 64.0);
        assert_eq!(ranges[0].max_point.value, 118.0);
        // Gap-filled hour
        assert_eq!(ranges[1].spread(), 0.0);
        assert_eq!(ranges[2].label(), "9");
    }

    #[test]
    fn test_sleep_minutes_per_day() {
        let sessions = vec![SleepSessionRecord::new(
            ts("2026-03-01T22:00:00Z"),
            ts("2026-03-02T06:30:00Z"),
        )];
        let pipeline = ChartPipeline::new(ChartConfig::sleep()).unwrap();
        let result = pipeline.run_intervals(&sessions).unwrap();
        let ChartOutput::Marks(marks) = result.output else {
            panic!("expected marks");
        };
        assert_eq!(marks.len(), 2);
        assert_eq!(marks[0].value, 120.0);
        assert_eq!(marks[1].value, 390.0);
    }

    #[test]
    fn test_blood_pressure_selected_channel() {
        let readings = vec![
            BloodPressureRecord::new(ts("2026-03-02T08:00:00Z"), 120.0, 80.0),
            BloodPressureRecord::new(ts("2026-03-04T08:00:00Z"), 130.0, 84.0),
            BloodPressureRecord::new(ts("2026-03-06T08:00:00Z"), 125.0, 82.0),
        ];
        let pipeline = ChartPipeline::new(ChartConfig::blood_pressure()).unwrap();
        let result = pipeline.run_points(&readings).unwrap();
        assert_eq!(
            result.output,
            ChartOutput::Marks(vec![Mark::new(0.0, 125.0, "Mar W1")])
        );
    }

    #[test]
    fn test_all_channels_without_selection() {
        let readings = vec![BloodPressureRecord::new(ts("2026-03-02T08:00:00Z"), 120.0, 80.0)];
        let config = ChartConfig::new(TimeUnit::Day, AggregationType::Sum);
        let result = ChartPipeline::new(config).unwrap().run_points(&readings).unwrap();
        let ChartOutput::Channels(channels) = result.output else {
            panic!("expected channel marks");
        };
        assert_eq!(channels["systolic"][0].value, 120.0);
        assert_eq!(channels["diastolic"][0].value, 80.0);
    }

    #[test]
    fn test_window_extends_fill() {
        let records = vec![StepsRecord::new(ts("2026-03-03T10:00:00Z"), ts("2026-03-03T10:10:00Z"), 500)];
        let pipeline = ChartPipeline::new(ChartConfig::new(TimeUnit::Day, AggregationType::Sum))
            .unwrap()
            .with_window(ts("2026-03-01T00:00:00Z"), ts("2026-03-07T00:00:00Z"));
        let result = pipeline.run_intervals(&records).unwrap();
        assert_eq!(result.output.len(), 7);
        assert_eq!(result.data.single_values().map(|v| v[2]), Some(500.0));
    }

    #[test]
    fn test_same_minute_points_are_summed() {
        let samples = vec![
            HeartRateSample::new(ts("2026-03-02T08:00:10Z"), 120.0),
            HeartRateSample::new(ts("2026-03-02T08:00:40Z"), 124.0),
        ];
        let pipeline = ChartPipeline::new(ChartConfig::new(TimeUnit::Minute, AggregationType::Sum)).unwrap();
        let result = pipeline.run_points(&samples).unwrap();

        assert_eq!(result.stats.samples, 2);
        assert_eq!(result.stats.buckets, 1);
        assert_eq!(
            result.output,
            ChartOutput::Marks(vec![Mark::new(0.0, 244.0, "8:00")])
        );
    }

    #[test]
    fn test_run_existing_data_set() {
        let data = TemporalDataSet::single(
            vec![ts("2026-03-02T00:10:00Z"), ts("2026-03-04T13:00:00Z")],
            vec![5.0, 7.0],
            TimeUnit::Minute,
        )
        .unwrap();
        let pipeline = ChartPipeline::new(ChartConfig::new(TimeUnit::Day, AggregationType::Sum)).unwrap();
        let result = pipeline.run(&data).unwrap();

        assert_eq!(result.stats.records_in, 2);
        assert_eq!(result.stats.samples, 2);
        assert_eq!(result.stats.buckets, 3);
        assert_eq!(result.data.single_values(), Some(&[5.0, 0.0, 7.0][..]));
        assert_eq!(
            result.output,
            ChartOutput::Marks(vec![
                Mark::new(0.0, 5.0, "3/2 Mon"),
                Mark::new(1.0, 0.0, "3/3 Tue"),
                Mark::new(2.0, 7.0, "3/4 Wed"),
            ])
        );
    }

    #[test]
    fn test_no_fill_keeps_sparse_buckets() {
        let records = vec![
            StepsRecord::new(ts("2026-03-02T00:00:00Z"), ts("2026-03-02T00:02:00Z"), 60),
            StepsRecord::new(ts("2026-03-02T05:30:00Z"), ts("2026-03-02T05:31:00Z"), 10),
        ];
        let config = ChartConfig::steps().with_fill_gaps(false);
        let pipeline = ChartPipeline::new(config)
            .unwrap()
            .with_window(ts("2026-03-01T00:00:00Z"), ts("2026-03-03T00:00:00Z"));
        let result = pipeline.run_intervals(&records).unwrap();

        assert_eq!(result.stats.buckets, 2);
        assert_eq!(
            result.data.timestamps(),
            &[ts("2026-03-02T00:00:00Z"), ts("2026-03-02T05:00:00Z")]
        );
        assert_eq!(
            result.output,
            ChartOutput::Marks(vec![
                Mark::new(0.0, 60.0, "0"),
                Mark::new(1.0, 10.0, "5"),
            ])
        );
    }

    #[test]
    fn test_precondition_errors_propagate() {
        let readings = vec![BloodPressureRecord::new(ts("2026-03-02T08:00:00Z"), 120.0, 80.0)];
        let config = ChartConfig::new(TimeUnit::Hour, AggregationType::MinMax);
        let err = ChartPipeline::new(config).unwrap().run_points(&readings).unwrap_err();
        assert!(matches!(err, VitalisError::UnsupportedAggregation(_)));

        let config = ChartConfig::new(TimeUnit::Hour, AggregationType::DailyAverage);
        assert!(ChartPipeline::new(config).is_err());
    }
}
