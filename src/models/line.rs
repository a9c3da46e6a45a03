use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::touch::{LevelType, TouchAnalysis};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LineType {
    Support,
    Resistance,
    Trendline,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

/// Trendline priority classes, lowest first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrendlinePriority {
    Low,
    Medium,
    High,
}

/// A fitted trendline, anchored in absolute time so it can be evaluated on any timeframe.
///
/// `price(t) = intercept + slope * (t - anchor_time)`, with `slope` in price per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendlineCoordinates {
    pub start_time: i64,
    pub start_price: f64,
    pub end_time: i64,
    pub end_price: f64,
    pub anchor_time: i64,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Slope as a percentage of the fitted points' mean price, per bar of the source timeframe.
    pub slope_pct_per_bar: f64,
    pub direction: TrendDirection,
    /// Whether the line acts as rising/falling support (troughs) or resistance (peaks).
    pub role: LevelType,
    pub priority: TrendlinePriority,
    pub source_timeframe: String,
}

impl TrendlineCoordinates {
    pub fn price_at(&self, time: i64) -> f64 {
        self.intercept + self.slope * (time - self.anchor_time) as f64
    }
}

/// The price (horizontal level) or coordinates (trendline) of a detected line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LineGeometry {
    Horizontal { price: f64 },
    Trendline(TrendlineCoordinates),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    /// Wick touches per body/exact touch.
    pub wick_body_ratio: f64,
    /// Share of touches (0-1) with above-threshold volume.
    pub volume_confirmation: f64,
    /// Share of touches (0-1) followed by a strong bounce.
    pub bounce_confirmation: f64,
    /// Within [0, 100].
    pub overall_quality: f64,
}

/// An accepted horizontal level or trendline with its supporting evidence.
///
/// Built once by the engine after the acceptance filters pass; consumers only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedLine {
    pub id: String,
    pub geometry: LineGeometry,
    pub line_type: LineType,
    /// Within [0, 1].
    pub confidence: f64,
    /// Within [0, 1].
    pub strength: f64,
    pub touch_count: usize,
    pub supporting_timeframes: Vec<String>,
    pub touch_analysis: TouchAnalysis,
    pub quality_metrics: QualityMetrics,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl EnhancedLine {
    /// Line price at `time` (constant for horizontal levels).
    pub fn price_at(&self, time: i64) -> f64 {
        match &self.geometry {
            LineGeometry::Horizontal { price } => *price,
            LineGeometry::Trendline(coords) => coords.price_at(time),
        }
    }

    /// Horizontal price, or the trendline's price at its last anchor point.
    pub fn reference_price(&self) -> f64 {
        match &self.geometry {
            LineGeometry::Horizontal { price } => *price,
            LineGeometry::Trendline(coords) => coords.end_price,
        }
    }

    pub fn trendline(&self) -> Option<&TrendlineCoordinates> {
        match &self.geometry {
            LineGeometry::Trendline(coords) => Some(coords),
            LineGeometry::Horizontal { .. } => None,
        }
    }

    pub fn level_type(&self) -> LevelType {
        self.touch_analysis.level_type
    }

    /// Ranking key used to order results.
    pub fn rank_score(&self) -> f64 {
        self.confidence * self.strength
    }
}

impl fmt::Display for EnhancedLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}] {} | conf {:.2} | strength {:.2} | touches {} | tfs {}",
            self.id,
            self.description,
            self.confidence,
            self.strength,
            self.touch_count,
            self.supporting_timeframes.join(",")
        )
    }
}
