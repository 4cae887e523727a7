//! Vitalis Types - Core Vocabularies
//!
//! The closed enumerations that drive every bucketing and aggregation
//! decision: the calendar granularity a series is aligned to, and the
//! semantics used when values are folded into coarser buckets.
//!
//! Key Features:
//! - TimeUnit totally ordered by granularity
//! - AggregationType covering sum, daily average, duration and range
//! - Serialization support via serde, parsing via FromStr
//!
//! @version 0.1.0
//! @author Vitalis Development Team

use crate::error::VitalisError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Time Unit
// =============================================================================

/// Calendar granularity, ordered from finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    /// Every unit, finest first.
    pub const ALL: [TimeUnit; 6] = [
        TimeUnit::Minute,
        TimeUnit::Hour,
        TimeUnit::Day,
        TimeUnit::Week,
        TimeUnit::Month,
        TimeUnit::Year,
    ];

    /// Returns true if `self` is at most as coarse as `other`.
    pub fn is_smaller_or_equal(&self, other: TimeUnit) -> bool {
        *self <= other
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = VitalisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeUnit::ALL
            .into_iter()
            .find(|unit| unit.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| VitalisError::Configuration(format!("unknown time unit: {}", s)))
    }
}

// =============================================================================
// Aggregation Type
// =============================================================================

/// How values mapped into the same bucket are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AggregationType {
    /// Sum of all values in the bucket.
    #[default]
    Sum,
    /// Average per calendar day, then averaged over the days that have data.
    DailyAverage,
    /// Number of minute samples in the bucket, i.e. minutes of occurrence.
    DurationSum,
    /// Minimum and maximum of the bucket, emitted as "min"/"max" channels.
    MinMax,
}

impl AggregationType {
    pub const ALL: [AggregationType; 4] = [
        AggregationType::Sum,
        AggregationType::DailyAverage,
        AggregationType::DurationSum,
        AggregationType::MinMax,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::DailyAverage => "daily_average",
            Self::DurationSum => "duration_sum",
            Self::MinMax => "min_max",
        }
    }
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationType {
    type Err = VitalisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_");
        AggregationType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| VitalisError::Configuration(format!("unknown aggregation: {}", s)))
    }
}

// =============================================================================
// Tests
// =============================================================================
