//! Analysis and detection configuration
//!
//! Every tunable lives here with its default. `DetectionConfig::validate` is the single
//! gate that rejects out-of-range values before any analysis runs.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound for any setting measured in bars (lookbacks, spans, recency windows).
pub const MAX_WINDOW_BARS: usize = 10_000;

/// Settings for classifying and scoring touches against a level (wick / body / exact).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchConfig {
    /// Base strength of a touch where only the wick reaches the level.
    pub wick_weight: f64,
    /// Base strength of a touch where the candle body reaches the level.
    pub body_weight: f64,
    /// Base strength of a touch where the close sits on the level (within half tolerance).
    pub exact_weight: f64,
    // volume / average volume must exceed this to count as high-volume confirmation
    pub volume_threshold_multiplier: f64,
    // Minimum max bounce (percent of level) after a touch to count as a strong bounce
    pub bounce_threshold_percent: f64,
    // How many bars after a touch are scanned for the bounce
    pub lookforward_bars: usize,
    /// Touch tolerance as a percentage of the level price (0.1 = 0.1%).
    pub tolerance_percent: f64,
}

pub const DEFAULT_TOUCH: TouchConfig = TouchConfig {
    wick_weight: 0.7,
    body_weight: 1.0,
    exact_weight: 1.2,
    volume_threshold_multiplier: 1.2,
    bounce_threshold_percent: 0.3,
    lookforward_bars: 5,
    tolerance_percent: 0.1,
};

impl Default for TouchConfig {
    fn default() -> Self {
        DEFAULT_TOUCH
    }
}

impl TouchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("touch.wick_weight", self.wick_weight)?;
        check_positive("touch.body_weight", self.body_weight)?;
        check_positive("touch.exact_weight", self.exact_weight)?;
        check_positive(
            "touch.volume_threshold_multiplier",
            self.volume_threshold_multiplier,
        )?;
        check_non_negative(
            "touch.bounce_threshold_percent",
            self.bounce_threshold_percent,
        )?;
        check_bars("touch.lookforward_bars", self.lookforward_bars, 1)?;
        check_percent("touch.tolerance_percent", self.tolerance_percent)?;
        Ok(())
    }

    /// Copy of this config with a different touch tolerance.
    pub fn with_tolerance_percent(&self, tolerance_percent: f64) -> Self {
        Self {
            tolerance_percent,
            ..self.clone()
        }
    }
}

/// Settings for merging levels across timeframes and building confluence zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Levels within this percentage of a cluster's running average join that cluster.
    pub price_tolerance_percent: f64,
    /// Distinct timeframes a level needs before it is considered at all.
    pub min_timeframes: usize,
    /// Total width of the price window placed around each level when forming zones.
    pub zone_width_percent: f64,
    // Recent closes used for the support/resistance majority vote
    pub level_type_lookback: usize,
    // Minimum member levels for a confluence zone
    pub min_zone_levels: usize,
}

pub const DEFAULT_AGGREGATION: AggregationConfig = AggregationConfig {
    price_tolerance_percent: 0.5,
    min_timeframes: 2,
    zone_width_percent: 1.0,
    level_type_lookback: 20,
    min_zone_levels: 2,
};

impl Default for AggregationConfig {
    fn default() -> Self {
        DEFAULT_AGGREGATION
    }
}

impl AggregationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_percent(
            "aggregation.price_tolerance_percent",
            self.price_tolerance_percent,
        )?;
        check_min("aggregation.min_timeframes", self.min_timeframes, 1)?;
        check_percent("aggregation.zone_width_percent", self.zone_width_percent)?;
        check_bars(
            "aggregation.level_type_lookback",
            self.level_type_lookback,
            1,
        )?;
        check_min("aggregation.min_zone_levels", self.min_zone_levels, 1)?;
        Ok(())
    }
}

/// Settings for the trendline search (pairs of swing points, regression, scoring).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendlineConfig {
    /// Swing points (endpoints included) required on a line before it is fitted.
    pub min_trendline_points: usize,
    /// Minimum bar distance between the two anchor swing points.
    pub min_timespan_bars: usize,
    /// Maximum |slope| in percent of mean price per bar.
    pub max_trendline_slope: f64,
    pub r_squared_threshold: f64,
    /// Swing points within this percentage of the anchor line are used in the fit.
    pub point_tolerance_percent: f64,
    /// A line ending within this many bars of the latest candle is "recent".
    pub recent_bars: usize,
    /// Only the most recent swing points of each kind are paired (bounds the O(n^2) search).
    pub max_swing_points: usize,
    /// Candidates kept per timeframe and side after heuristic pre-scoring.
    pub top_candidates: usize,
    pub high_priority_confidence: f64,
    /// Accepted lines whose projections stay within this percentage of each other are merged.
    pub dedupe_tolerance_percent: f64,
}

pub const DEFAULT_TRENDLINE: TrendlineConfig = TrendlineConfig {
    min_trendline_points: 3,
    min_timespan_bars: 10,
    max_trendline_slope: 5.0,
    r_squared_threshold: 0.8,
    point_tolerance_percent: 0.5,
    recent_bars: 20,
    max_swing_points: 30,
    top_candidates: 5,
    high_priority_confidence: 0.8,
    dedupe_tolerance_percent: 0.5,
};

impl Default for TrendlineConfig {
    fn default() -> Self {
        DEFAULT_TRENDLINE
    }
}

impl TrendlineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_min(
            "trendline.min_trendline_points",
            self.min_trendline_points,
            2,
        )?;
        check_bars("trendline.min_timespan_bars", self.min_timespan_bars, 1)?;
        check_positive("trendline.max_trendline_slope", self.max_trendline_slope)?;
        check_unit("trendline.r_squared_threshold", self.r_squared_threshold)?;
        check_percent(
            "trendline.point_tolerance_percent",
            self.point_tolerance_percent,
        )?;
        check_bars("trendline.recent_bars", self.recent_bars, 1)?;
        check_min("trendline.max_swing_points", self.max_swing_points, 2)?;
        check_min("trendline.top_candidates", self.top_candidates, 1)?;
        check_unit(
            "trendline.high_priority_confidence",
            self.high_priority_confidence,
        )?;
        check_non_negative(
            "trendline.dedupe_tolerance_percent",
            self.dedupe_tolerance_percent,
        )?;
        Ok(())
    }
}

/// The master detection configuration handed to `LineDetectionEngine::new`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub touch: TouchConfig,
    pub aggregation: AggregationConfig,
    pub trendline: TrendlineConfig,

    /// Half-width of the swing point window (a swing is the strict extreme of 2*lookback+1 bars).
    pub swing_lookback: usize,

    // Acceptance thresholds, applied in this order
    pub min_touch_count: usize,
    pub min_quality_score: f64,
    pub require_volume_confirmation: bool,
    /// Share of touches (0-1) that must carry above-threshold volume.
    pub volume_confirmation_threshold: f64,
    pub require_bounce_confirmation: bool,
    /// Share of touches (0-1) that must be followed by a strong bounce.
    pub bounce_confirmation_threshold: f64,
    pub min_confidence: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            touch: TouchConfig::default(),
            aggregation: AggregationConfig::default(),
            trendline: TrendlineConfig::default(),
            swing_lookback: 3,
            min_touch_count: 3,
            min_quality_score: 50.0,
            require_volume_confirmation: false,
            volume_confirmation_threshold: 0.3,
            require_bounce_confirmation: false,
            bounce_confirmation_threshold: 0.3,
            min_confidence: 0.5,
        }
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.touch.validate()?;
        self.aggregation.validate()?;
        self.trendline.validate()?;

        check_bars("swing_lookback", self.swing_lookback, 1)?;
        check_min("min_touch_count", self.min_touch_count, 1)?;
        check_range("min_quality_score", self.min_quality_score, 0.0, 100.0)?;
        check_unit(
            "volume_confirmation_threshold",
            self.volume_confirmation_threshold,
        )?;
        check_unit(
            "bounce_confirmation_threshold",
            self.bounce_confirmation_threshold,
        )?;
        check_unit("min_confidence", self.min_confidence)?;

        if self.trendline.high_priority_confidence < self.min_confidence {
            return Err(ConfigError::Inconsistent {
                reason: format!(
                    "trendline.high_priority_confidence ({}) is below min_confidence ({})",
                    self.trendline.high_priority_confidence, self.min_confidence
                ),
            });
        }
        Ok(())
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    check_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    check_finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    check_finite(field, value)?;
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

// Percentages must be strictly positive and at most 100
fn check_percent(field: &'static str, value: f64) -> Result<(), ConfigError> {
    check_positive(field, value)?;
    check_range(field, value, 0.0, 100.0)
}

fn check_unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    check_range(field, value, 0.0, 1.0)
}

fn check_min(field: &'static str, value: usize, min: usize) -> Result<(), ConfigError> {
    if value >= min {
        Ok(())
    } else {
        Err(ConfigError::TooSmall { field, value, min })
    }
}

// Window lengths measured in bars
fn check_bars(field: &'static str, value: usize, min: usize) -> Result<(), ConfigError> {
    check_min(field, value, min)?;
    if value <= MAX_WINDOW_BARS {
        Ok(())
    } else {
        Err(ConfigError::TooLarge {
            field,
            value,
            max: MAX_WINDOW_BARS,
        })
    }
}
