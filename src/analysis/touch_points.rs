use crate::analysis::confidence::touch_quality_score;
use crate::config::TouchConfig;
use crate::domain::Candle;
use crate::error::ConfigError;
use crate::models::{LevelType, TouchAnalysis, TouchPoint, TouchType};
use crate::utils::maths_utils::{get_max, get_min, mean_or_zero, pct_change, ratio_or};

/// Classifies and scores every candle's interaction with a level.
///
/// One analyzer is built per engine from a validated `TouchConfig` and handed to whatever
/// needs it. Tolerance overrides get their own analyzer via `with_tolerance_percent`.
#[derive(Debug, Clone)]
pub struct TouchPointAnalyzer {
    config: TouchConfig,
}

impl TouchPointAnalyzer {
    pub fn new(config: TouchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TouchConfig {
        &self.config
    }

    /// Analyzer identical to this one except for the touch tolerance.
    pub fn with_tolerance_percent(&self, tolerance_percent: f64) -> Result<Self, ConfigError> {
        Self::new(self.config.with_tolerance_percent(tolerance_percent))
    }

    /// Touches of a horizontal level over the whole series.
    pub fn analyze_level(
        &self,
        candles: &[Candle],
        price_level: f64,
        level_type: LevelType,
    ) -> TouchAnalysis {
        self.analyze_from(candles, 0, price_level, level_type, |_| price_level)
    }

    /// Touches of a sloped line, starting at the first candle at or after `start_time`.
    ///
    /// `level_at` gives the line price at a candle time. `price_level` is only recorded as
    /// the analysis' reference price. Touch indices stay relative to the full `candles` slice.
    pub fn analyze_line<F>(
        &self,
        candles: &[Candle],
        start_time: i64,
        price_level: f64,
        level_type: LevelType,
        level_at: F,
    ) -> TouchAnalysis
    where
        F: Fn(i64) -> f64,
    {
        let first = candles.partition_point(|c| c.time < start_time);
        self.analyze_from(candles, first, price_level, level_type, level_at)
    }

    fn analyze_from<F>(
        &self,
        candles: &[Candle],
        first: usize,
        price_level: f64,
        level_type: LevelType,
        level_at: F,
    ) -> TouchAnalysis
    where
        F: Fn(i64) -> f64,
    {
        let window = candles.get(first..).unwrap_or_default();
        if window.is_empty() || !price_level.is_finite() || price_level <= 0.0 {
            return TouchAnalysis::empty(price_level, level_type, window.len());
        }

        let volumes: Vec<f64> = window.iter().map(|c| c.volume).collect();
        let average_volume = mean_or_zero(&volumes);

        let touch_points: Vec<TouchPoint> = window
            .iter()
            .enumerate()
            .filter_map(|(offset, candle)| {
                let level = level_at(candle.time);
                let touch_type = self.classify(candle, level, level_type)?;
                let touch = TouchPoint {
                    price: level,
                    time: candle.time,
                    index: first + offset,
                    level_type,
                    touch_type,
                    strength: self.base_strength(touch_type),
                    volume: candle.volume,
                    // No volume at all in the window is neutral, not a signal
                    volume_ratio: ratio_or(candle.volume, average_volume, 1.0),
                    bounce_strength: None,
                    bounce_direction: None,
                    price_movement: None,
                }
                .with_volume_boost(self.config.volume_threshold_multiplier);

                Some(self.apply_bounce(touch, window, offset, level))
            })
            .collect();

        summarize_touches(
            price_level,
            level_type,
            window.len(),
            average_volume,
            touch_points,
            &self.config,
        )
    }

    /// How (if at all) a candle reaches `level`. `None` means no touch.
    pub fn classify(&self, candle: &Candle, level: f64, level_type: LevelType) -> Option<TouchType> {
        if !level.is_finite() || level <= 0.0 {
            return None;
        }
        let tolerance = level * self.config.tolerance_percent / 100.0;

        let (extreme, body_edge) = match level_type {
            LevelType::Support => (candle.low, candle.body_low()),
            LevelType::Resistance => (candle.high, candle.body_high()),
        };

        if (extreme - level).abs() > tolerance {
            return None;
        }
        if (candle.close - level).abs() <= tolerance / 2.0 {
            Some(TouchType::Exact)
        } else if (body_edge - level).abs() <= tolerance {
            Some(TouchType::Body)
        } else {
            Some(TouchType::Wick)
        }
    }

    fn base_strength(&self, touch_type: TouchType) -> f64 {
        match touch_type {
            TouchType::Wick => self.config.wick_weight,
            TouchType::Body => self.config.body_weight,
            TouchType::Exact => self.config.exact_weight,
        }
    }

    // Needs a full look-forward window; touches near the end of the series keep no bounce data
    fn apply_bounce(&self, touch: TouchPoint, window: &[Candle], offset: usize, level: f64) -> TouchPoint {
        let lookforward = self.config.lookforward_bars;
        if offset.saturating_add(lookforward) >= window.len() {
            return touch;
        }
        let forward = &window[offset + 1..=offset + lookforward];

        let extreme = match touch.level_type {
            LevelType::Support => {
                let highs: Vec<f64> = forward.iter().map(|c| c.high).collect();
                get_max(&highs).map(|high| (high - level) / level * 100.0)
            }
            LevelType::Resistance => {
                let lows: Vec<f64> = forward.iter().map(|c| c.low).collect();
                get_min(&lows).map(|low| (level - low) / level * 100.0)
            }
        };
        let max_bounce = extreme.unwrap_or(0.0);

        let movement = forward
            .last()
            .map(|last| pct_change(window[offset].close, last.close));

        touch.with_bounce(max_bounce, self.config.bounce_threshold_percent, movement)
    }
}

/// Builds a `TouchAnalysis` from a list of touches: counts, volume-weighted strength, quality.
///
/// Used both for a single series and for touches merged across timeframes, where
/// `candle_count` and `average_volume` describe the combined series.
pub fn summarize_touches(
    price_level: f64,
    level_type: LevelType,
    candle_count: usize,
    average_volume: f64,
    touch_points: Vec<TouchPoint>,
    config: &TouchConfig,
) -> TouchAnalysis {
    let count_type = |t: TouchType| touch_points.iter().filter(|p| p.touch_type == t).count();
    let wick_count = count_type(TouchType::Wick);
    let body_count = count_type(TouchType::Body);
    let exact_count = count_type(TouchType::Exact);

    let strong_bounce_count = touch_points.iter().filter(|p| p.has_strong_bounce()).count();
    let high_volume_count = touch_points
        .iter()
        .filter(|p| p.is_high_volume(config.volume_threshold_multiplier))
        .count();

    let mut analysis = TouchAnalysis {
        price_level,
        level_type,
        candle_count,
        volume_weighted_strength: volume_weighted_strength(&touch_points),
        touch_points,
        average_volume,
        wick_count,
        body_count,
        exact_count,
        strong_bounce_count,
        high_volume_count,
        touch_quality_score: 0.0,
    };
    analysis.touch_quality_score = touch_quality_score(&analysis);
    analysis
}

/// `sum(strength * volume) / sum(volume)`; the plain mean strength when no touch traded volume.
pub fn volume_weighted_strength(touch_points: &[TouchPoint]) -> f64 {
    let total_volume: f64 = touch_points.iter().map(|t| t.volume).sum();
    let weighted: f64 = touch_points.iter().map(|t| t.strength * t.volume).sum();

    if total_volume > 0.0 {
        weighted / total_volume
    } else {
        let strengths: Vec<f64> = touch_points.iter().map(|t| t.strength).collect();
        mean_or_zero(&strengths)
    }
}
