use serde::{Deserialize, Serialize};

use crate::models::line::EnhancedLine;
use crate::models::touch::LevelType;
use crate::models::zone::ConfluenceZone;

/// Bookkeeping for one detection call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionStats {
    /// Horizontal clusters plus fitted trendline candidates considered.
    pub total_candidates: usize,
    /// Candidates that passed the minimum quality filter.
    pub quality_filtered: usize,
    /// Candidates that passed the minimum touch count filter.
    pub touch_filtered: usize,
    /// Lines returned (horizontal + trendlines).
    pub final_lines: usize,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub symbol: String,
    /// Sorted by `confidence * strength`, best first.
    pub horizontal_lines: Vec<EnhancedLine>,
    /// Sorted by `confidence * strength`, best first.
    pub trendlines: Vec<EnhancedLine>,
    pub confluence_zones: Vec<ConfluenceZone>,
    pub detection_stats: DetectionStats,
}

impl DetectionResult {
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.horizontal_lines.is_empty() && self.trendlines.is_empty()
    }

    /// Closest accepted support level strictly below `price`.
    pub fn nearest_support(&self, price: f64) -> Option<&EnhancedLine> {
        self.horizontal_lines
            .iter()
            .filter(|line| line.level_type() == LevelType::Support)
            .filter(|line| line.reference_price() < price)
            .min_by(|a, b| {
                (price - a.reference_price()).total_cmp(&(price - b.reference_price()))
            })
    }

    /// Closest accepted resistance level strictly above `price`.
    pub fn nearest_resistance(&self, price: f64) -> Option<&EnhancedLine> {
        self.horizontal_lines
            .iter()
            .filter(|line| line.level_type() == LevelType::Resistance)
            .filter(|line| line.reference_price() > price)
            .min_by(|a, b| {
                (a.reference_price() - price).total_cmp(&(b.reference_price() - price))
            })
    }

    /// Confluence zones whose price range contains `price`.
    pub fn zones_at_price(&self, price: f64) -> Vec<&ConfluenceZone> {
        self.confluence_zones
            .iter()
            .filter(|zone| zone.contains(price))
            .collect()
    }
}

/// How strongly an arbitrary price is backed by touches across timeframes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossTimeframeValidation {
    pub price: f64,
    /// Within [0, 1]. Zero when no timeframe touches the price.
    pub validation_score: f64,
    pub supporting_timeframes: Vec<String>,
    /// Mean touch strength over all touches in supporting timeframes.
    pub average_strength: f64,
    /// Touch count per supporting timeframe, in timeframe order.
    pub touches_per_timeframe: Vec<(String, usize)>,
}
