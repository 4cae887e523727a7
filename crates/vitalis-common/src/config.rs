//! Vitalis Config - Chart Configuration
//!
//! Configuration types describing how a raw measurement stream becomes a
//! chart: the target bucket granularity, the aggregation semantics, whether
//! missing buckets are zero-filled, and which channel to plot. Supports
//! loading from TOML files and programmatic construction, with presets for
//! the common health record domains.
//!
//! @version 0.1.0
//! @author Vitalis Development Team

use crate::error::{Result, VitalisError};
use crate::types::{AggregationType, TimeUnit};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

// =============================================================================
// Chart Configuration
// =============================================================================

/// Configuration for a single chart pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub target_unit: TimeUnit,
    pub aggregation: AggregationType,
    pub fill_gaps: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            target_unit: TimeUnit::Day,
            aggregation: AggregationType::Sum,
            fill_gaps: true,
            channel: None,
        }
    }
}

impl ChartConfig {
    pub fn new(target_unit: TimeUnit, aggregation: AggregationType) -> Self {
        Self {
            target_unit,
            aggregation,
            ..Default::default()
        }
    }

    pub fn with_fill_gaps(mut self, fill_gaps: bool) -> Self {
        self.fill_gaps = fill_gaps;
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| VitalisError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| VitalisError::Serialization(e.to_string()))
    }

    /// Reject combinations that can never succeed, before any data is read.
    pub fn validate(&self) -> Result<()> {
        if self.aggregation == AggregationType::DailyAverage
            && !TimeUnit::Day.is_smaller_or_equal(self.target_unit)
        {
            return Err(VitalisError::Configuration(format!(
                "daily_average cannot target {} buckets",
                self.target_unit
            )));
        }
        if self.aggregation == AggregationType::MinMax && self.channel.is_some() {
            return Err(VitalisError::Configuration(
                "min_max charts always plot the min/max channel pair".to_string(),
            ));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Presets
    // -------------------------------------------------------------------------

    /// Hourly step totals.
    pub fn steps() -> Self {
        Self::new(TimeUnit::Hour, AggregationType::Sum)
    }

    /// Hourly heart rate range.
    pub fn heart_rate() -> Self {
        Self::new(TimeUnit::Hour, AggregationType::MinMax)
    }

    /// Minutes asleep per day.
    pub fn sleep() -> Self {
        Self::new(TimeUnit::Day, AggregationType::DurationSum)
    }

    /// Weekly average of daily systolic readings.
    pub fn blood_pressure() -> Self {
        Self::new(TimeUnit::Week, AggregationType::DailyAverage).with_channel("systolic")
    }

    /// Daily nutrient totals, all channels.
    pub fn nutrition() -> Self {
        Self::new(TimeUnit::Day, AggregationType::Sum)
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "steps" => Some(Self::steps()),
            "heart_rate" | "heart-rate" => Some(Self::heart_rate()),
            "sleep" => Some(Self::sleep()),
            "blood_pressure" | "blood-pressure" => Some(Self::blood_pressure()),
            "nutrition" => Some(Self::nutrition()),
            _ => None,
        }
    }
}

// =============================================================================
// Dashboard Configuration
// =============================================================================

/// A named collection of chart configurations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub charts: IndexMap<String, ChartConfig>,
}

impl DashboardConfig {
    /// Dashboard containing every preset.
    pub fn presets() -> Self {
        let charts = ["steps", "heart_rate", "sleep", "blood_pressure", "nutrition"]
            .into_iter()
            .filter_map(|name| ChartConfig::preset(name).map(|config| (name.to_string(), config)))
            .collect();
        Self { charts }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| VitalisError::Configuration(e.to_string()))?;
        for (name, chart) in &config.charts {
            chart
                .validate()
                .map_err(|e| VitalisError::Configuration(format!("chart '{}': {}", name, e)))?;
        }
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| VitalisError::Serialization(e.to_string()))
    }

    pub fn chart(&self, name: &str) -> Option<&ChartConfig> {
        self.charts.get(name)
    }
}

// =============================================================================
// Tests
// =============================================================================
