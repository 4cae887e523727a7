//! Vitalis Common - Shared Types and Configuration
//!
//! Foundational vocabulary, error handling, and configuration used across
//! the Vitalis health charting components. Provides the closed enums that
//! drive every bucketing decision so the core, the CLI, and configuration
//! files all speak the same language.
//!
//! Key Features:
//! - Unified error type with validation/user error classification
//! - Time unit and aggregation vocabularies (TimeUnit, AggregationType)
//! - Chart configuration loadable from TOML with domain presets
//!
//! @version 0.1.0
//! @author Vitalis Development Team

pub mod config;
pub mod error;
pub mod types;

pub use config::{ChartConfig, DashboardConfig};
pub use error::{Result, VitalisError};
pub use types::*;
