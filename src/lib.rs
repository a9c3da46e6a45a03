// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod models;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::DetectionConfig;
pub use domain::{Candle, MultiTimeframeData, TimeframeData};
pub use engine::LineDetectionEngine;
pub use error::ConfigError;
pub use models::{ConfluenceZone, CrossTimeframeValidation, DetectionResult, EnhancedLine};

// CLI argument parsing
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Detect support/resistance levels and trendlines across timeframes", long_about = None)]
pub struct Cli {
    /// Multi-timeframe candle snapshot (JSON)
    #[arg(long, short)]
    pub input: PathBuf,

    /// Detection config overrides (JSON); missing fields keep their defaults
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Print the full detection result as JSON instead of a summary
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Also score this price against every timeframe
    #[arg(long)]
    pub validate_price: Option<f64>,
}
