//! Vitalis Time Series - Temporal Aggregation Pipeline
//!
//! Turns irregular, interval-stamped health measurements into uniformly
//! bucketed, chart-ready series. Raw records are split across the minutes
//! they cover, re-bucketed into a target calendar unit, densified, and
//! converted into labeled plot marks.
//!
//! Key Features:
//! - Proportional minute distribution of interval records
//! - Minute to year bucketing with sum, daily average, duration and min/max
//! - Calendar-aware gap filling (Sunday weeks, calendar months and years)
//! - Labeled marks, per-channel marks, and min/max range marks
//!
//! All operations are pure transforms over immutable inputs and are safe to
//! call concurrently on independent data.
//!
//! @version 0.1.0
//! @author Vitalis Development Team

pub mod types;
pub mod calendar;
pub mod records;
pub mod distribution;
pub mod aggregation;
pub mod gapfill;
pub mod marks;
pub mod pipeline;

pub use types::{Channels, SeriesValues, TemporalDataSet};
pub use calendar::{bucket_start, buckets_between, next_bucket};
pub use records::{
    BloodPressureRecord, DistanceRecord, Fields, HeartRateSample, IntervalRecord, NutritionRecord,
    RawRecord, SleepSessionRecord, StepsRecord,
};
pub use distribution::{distribute, wrap_points, IntervalDistributor};
pub use aggregation::{aggregate, Bucketer, MAX_CHANNEL, MIN_CHANNEL};
pub use gapfill::{fill_gaps, fill_gaps_in_range};
pub use marks::{
    all_channel_marks, channel_marks, generate_label, range_marks, to_marks, Mark, RangeMark,
};
pub use pipeline::{ChartOutput, ChartPipeline, ChartResult, PipelineStats};

pub use vitalis_common::{AggregationType, ChartConfig, Result, TimeUnit, VitalisError};
