//! Vitalis Time Series Records
//!
//! The narrow record interface consumed by the distributor, and the health
//! record types that implement it. The core only ever sees a start instant,
//! an end instant, and named numeric fields.
//!
//! @version 0.1.0
//! @author Vitalis Development Team

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Named numeric fields of a record, in declaration order.
pub type Fields = IndexMap<String, f64>;

// =============================================================================
// Interval Record
// =============================================================================

/// A raw measurement covering `[start_time, end_time)`.
///
/// Point-in-time measurements return the same instant for both ends.
pub trait IntervalRecord {
    fn start_time(&self) -> DateTime<Utc>;
    fn end_time(&self) -> DateTime<Utc>;
    fn fields(&self) -> Fields;
}

impl<T: IntervalRecord + ?Sized> IntervalRecord for &T {
    fn start_time(&self) -> DateTime<Utc> {
        (**self).start_time()
    }

    fn end_time(&self) -> DateTime<Utc> {
        (**self).end_time()
    }

    fn fields(&self) -> Fields {
        (**self).fields()
    }
}

fn fields_of<'a>(pairs: impl IntoIterator<Item = (&'a str, Option<f64>)>) -> Fields {
    pairs
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
        .collect()
}

// =============================================================================
// Raw Record
// =============================================================================

/// Domain-agnostic record, as read from JSON at the CLI boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub start_time: DateTime<Utc>,
    /// Absent for point measurements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub fields: Fields,
}

impl RawRecord {
    pub fn interval(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            end_time: Some(end_time),
            fields: Fields::new(),
        }
    }

    pub fn point(time: DateTime<Utc>) -> Self {
        Self {
            start_time: time,
            end_time: None,
            fields: Fields::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: f64) -> Self {
        self.fields.insert(name.into(), value);
        self
    }
}

impl IntervalRecord for RawRecord {
    fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    fn end_time(&self) -> DateTime<Utc> {
        self.end_time.unwrap_or(self.start_time)
    }

    fn fields(&self) -> Fields {
        self.fields.clone()
    }
}

// =============================================================================
// Activity
// =============================================================================

/// Steps taken over an interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepsRecord {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub count: u64,
}

impl StepsRecord {
    pub const FIELD: &'static str = "steps";

    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>, count: u64) -> Self {
        Self {
            start_time,
            end_time,
            count,
        }
    }
}

impl IntervalRecord for StepsRecord {
    fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    fn fields(&self) -> Fields {
        fields_of([(Self::FIELD, Some(self.count as f64))])
    }
}

/// Distance covered over an interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceRecord {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub meters: f64,
}

impl IntervalRecord for DistanceRecord {
    fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    fn fields(&self) -> Fields {
        fields_of([("distance_meters", Some(self.meters))])
    }
}

// =============================================================================
// Sleep
// =============================================================================

/// A sleep session. Its single field is the session length in minutes, so
/// a proportional split yields minutes asleep per bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSessionRecord {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl SleepSessionRecord {
    pub const FIELD: &'static str = "sleep_minutes";

    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            end_time,
        }
    }
}

impl IntervalRecord for SleepSessionRecord {
    fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    fn fields(&self) -> Fields {
        let minutes = (self.end_time - self.start_time).num_seconds().max(0) as f64 / 60.0;
        fields_of([(Self::FIELD, Some(minutes))])
    }
}

// =============================================================================
// Nutrition
// =============================================================================

/// A meal or diet entry. Only recorded nutrients become fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NutritionRecord {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub energy_kcal: Option<f64>,
    pub protein_grams: Option<f64>,
    pub carbohydrate_grams: Option<f64>,
    pub fat_grams: Option<f64>,
}

impl IntervalRecord for NutritionRecord {
    fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    fn fields(&self) -> Fields {
        fields_of([
            ("energy_kcal", self.energy_kcal),
            ("protein_grams", self.protein_grams),
            ("carbohydrate_grams", self.carbohydrate_grams),
            ("fat_grams", self.fat_grams),
        ])
    }
}

// =============================================================================
// Vitals
// =============================================================================

/// A single heart rate reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
    pub time: DateTime<Utc>,
    pub beats_per_minute: f64,
}

impl HeartRateSample {
    pub const FIELD: &'static str = "bpm";

    pub fn new(time: DateTime<Utc>, beats_per_minute: f64) -> Self {
        Self {
            time,
            beats_per_minute,
        }
    }
}

impl IntervalRecord for HeartRateSample {
    fn start_time(&self) -> DateTime<Utc> {
        self.time
    }

    fn end_time(&self) -> DateTime<Utc> {
        self.time
    }

    fn fields(&self) -> Fields {
        fields_of([(Self::FIELD, Some(self.beats_per_minute))])
    }
}

/// A blood pressure reading in mmHg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodPressureRecord {
    pub time: DateTime<Utc>,
    pub systolic: f64,
    pub diastolic: f64,
}

impl BloodPressureRecord {
    pub fn new(time: DateTime<Utc>, systolic: f64, diastolic: f64) -> Self {
        Self {
            time,
            systolic,
            diastolic,
        }
    }
}

impl IntervalRecord for BloodPressureRecord {
    fn start_time(&self) -> DateTime<Utc> {
        self.time
    }

    fn end_time(&self) -> DateTime<Utc> {
        self.time
    }

    fn fields(&self) -> Fields {
        fields_of([("systolic", Some(self.systolic)), ("diastolic", Some(self.diastolic))])
    }
}

// =============================================================================
// Tests
// =============================================================================
