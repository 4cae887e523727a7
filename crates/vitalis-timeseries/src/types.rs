//! Vitalis Time Series Types
//!
//! The temporal data set: a timestamp sequence paired with either one value
//! channel or several named channels, aligned to a calendar unit.
//!
//! @version 0.1.0
//! @author Vitalis Development Team

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use vitalis_common::{Result, TimeUnit, VitalisError};

/// Named value channels, in insertion order.
pub type Channels = IndexMap<String, Vec<f64>>;

// =============================================================================
// Series Values
// =============================================================================

/// Values of a data set: one unnamed channel, or several named ones.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesValues {
    Single(Vec<f64>),
    Channels(Channels),
}

impl SeriesValues {
    /// Every value column, in channel order.
    pub fn columns(&self) -> Vec<&[f64]> {
        match self {
            Self::Single(values) => vec![values.as_slice()],
            Self::Channels(channels) => channels.values().map(Vec::as_slice).collect(),
        }
    }

    /// Same shape and channel names as `self`, holding `columns` instead.
    ///
    /// `columns` must be in the order returned by [`SeriesValues::columns`].
    pub fn with_columns(&self, columns: Vec<Vec<f64>>) -> SeriesValues {
        match self {
            Self::Single(_) => Self::Single(columns.into_iter().next().unwrap_or_default()),
            Self::Channels(channels) => Self::Channels(
                channels
                    .keys()
                    .cloned()
                    .zip(columns.into_iter().chain(std::iter::repeat_with(Vec::new)))
                    .collect(),
            ),
        }
    }

    pub fn channel_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Channels(channels) => channels.len(),
        }
    }
}

// =============================================================================
// Temporal Data Set
// =============================================================================

/// An immutable time series aligned to a calendar unit.
///
/// Every value column has exactly one entry per timestamp, and a
/// multi-channel set always holds at least one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DataSetRepr", into = "DataSetRepr")]
pub struct TemporalDataSet {
    timestamps: Vec<DateTime<Utc>>,
    values: SeriesValues,
    unit: TimeUnit,
}

impl TemporalDataSet {
    /// Create a data set, checking the column lengths.
    pub fn new(timestamps: Vec<DateTime<Utc>>, values: SeriesValues, unit: TimeUnit) -> Result<Self> {
        if let SeriesValues::Channels(channels) = &values {
            if channels.is_empty() {
                return Err(VitalisError::InvalidChannelSelection(
                    "multi-channel data set needs at least one channel".to_string(),
                ));
            }
            if let Some((name, column)) = channels.iter().find(|(_, c)| c.len() != timestamps.len()) {
                return Err(VitalisError::InvalidChannelSelection(format!(
                    "channel '{}' has {} values for {} timestamps",
                    name,
                    column.len(),
                    timestamps.len()
                )));
            }
        }
        if let SeriesValues::Single(column) = &values {
            if column.len() != timestamps.len() {
                return Err(VitalisError::InvalidChannelSelection(format!(
                    "{} values for {} timestamps",
                    column.len(),
                    timestamps.len()
                )));
            }
        }
        Ok(Self {
            timestamps,
            values,
            unit,
        })
    }

    /// Single-channel data set.
    pub fn single(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>, unit: TimeUnit) -> Result<Self> {
        Self::new(timestamps, SeriesValues::Single(values), unit)
    }

    /// Multi-channel data set.
    pub fn multi(timestamps: Vec<DateTime<Utc>>, channels: Channels, unit: TimeUnit) -> Result<Self> {
        Self::new(timestamps, SeriesValues::Channels(channels), unit)
    }

    /// Build from optional parts; exactly one of `values` and `channels` must be given.
    pub fn from_parts(
        timestamps: Vec<DateTime<Utc>>,
        values: Option<Vec<f64>>,
        channels: Option<Channels>,
        unit: TimeUnit,
    ) -> Result<Self> {
        match (values, channels) {
            (Some(values), None) => Self::single(timestamps, values, unit),
            (None, Some(channels)) => Self::multi(timestamps, channels, unit),
            (Some(_), Some(_)) => Err(VitalisError::InvalidChannelSelection(
                "both single values and channels provided".to_string(),
            )),
            (None, None) => Err(VitalisError::InvalidChannelSelection(
                "neither single values nor channels provided".to_string(),
            )),
        }
    }

    /// An empty single-channel data set.
    pub fn empty(unit: TimeUnit) -> Self {
        Self {
            timestamps: Vec::new(),
            values: SeriesValues::Single(Vec::new()),
            unit,
        }
    }

    /// Assemble parts that are aligned by construction.
    pub(crate) fn from_aligned(timestamps: Vec<DateTime<Utc>>, values: SeriesValues, unit: TimeUnit) -> Self {
        debug_assert!(values.columns().iter().all(|c| c.len() == timestamps.len()));
        Self {
            timestamps,
            values,
            unit,
        }
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn values(&self) -> &SeriesValues {
        &self.values
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn is_multi_channel(&self) -> bool {
        matches!(self.values, SeriesValues::Channels(_))
    }

    /// Values of a single-channel set.
    pub fn single_values(&self) -> Option<&[f64]> {
        match &self.values {
            SeriesValues::Single(values) => Some(values),
            SeriesValues::Channels(_) => None,
        }
    }

    /// Values of a named channel.
    pub fn channel(&self, name: &str) -> Option<&[f64]> {
        match &self.values {
            SeriesValues::Single(_) => None,
            SeriesValues::Channels(channels) => channels.get(name).map(Vec::as_slice),
        }
    }

    /// Channel names in order; empty for a single-channel set.
    pub fn channel_names(&self) -> Vec<&str> {
        match &self.values {
            SeriesValues::Single(_) => Vec::new(),
            SeriesValues::Channels(channels) => channels.keys().map(String::as_str).collect(),
        }
    }

    /// Earliest and latest timestamp, regardless of ordering.
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let min = self.timestamps.iter().min()?;
        let max = self.timestamps.iter().max()?;
        Some((*min, *max))
    }

    /// Check if timestamps are sorted ascending.
    pub fn is_sorted(&self) -> bool {
        self.timestamps.windows(2).all(|w| w[0] <= w[1])
    }

    pub fn into_parts(self) -> (Vec<DateTime<Utc>>, SeriesValues, TimeUnit) {
        (self.timestamps, self.values, self.unit)
    }
}

// =============================================================================
// Serialized Form
// =============================================================================

/// Wire shape of a data set; validated on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DataSetRepr {
    timestamps: Vec<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    channels: Option<Channels>,
    unit: TimeUnit,
}

impl TryFrom<DataSetRepr> for TemporalDataSet {
    type Error = VitalisError;

    fn try_from(repr: DataSetRepr) -> Result<Self> {
        Self::from_parts(repr.timestamps, repr.values, repr.channels, repr.unit)
    }
}

impl From<TemporalDataSet> for DataSetRepr {
    fn from(data: TemporalDataSet) -> Self {
        let (timestamps, values, unit) = data.into_parts();
        let (values, channels) = match values {
            SeriesValues::Single(values) => (Some(values), None),
            SeriesValues::Channels(channels) => (None, Some(channels)),
        };
        Self {
            timestamps,
            values,
            channels,
            unit,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
