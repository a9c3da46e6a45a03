//! Configuration module for the line detection engine.

pub mod analysis;

pub(crate) mod debug; // Flags are read via crate::config::debug::PRINT_*

// Re-export commonly used items
pub use analysis::{
    AggregationConfig, DEFAULT_AGGREGATION, DEFAULT_TOUCH, DEFAULT_TRENDLINE, DetectionConfig,
    MAX_WINDOW_BARS, TouchConfig, TrendlineConfig,
};
