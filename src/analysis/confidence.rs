//! Scoring: touch quality, generic touch confidence, and the trendline-specific confidence.
//!
//! The two confidence formulas are deliberately kept apart. `touch_confidence` scores any
//! `TouchAnalysis`; `trendline_confidence` scores an accepted trendline fit and takes the
//! touch confidence as one of its inputs. They are not expected to agree.

use crate::models::{LevelType, QualityMetrics, TouchAnalysis, TrendlinePriority};
use crate::utils::maths_utils::ratio_or;

// Touch quality caps (points out of 100)
const Q_DENSITY_CAP: f64 = 30.0;
const Q_BODY_SHARE: f64 = 20.0;
const Q_STRENGTH_CAP: f64 = 24.0;
const Q_VOLUME_SHARE: f64 = 15.0;
const Q_BOUNCE_SHARE: f64 = 15.0;

/// Quality score in [0, 100] from five independently capped factors.
///
/// - density: touches per 100 candles, times 3 (max 30)
/// - share of body/exact touches (max 20)
/// - average touch strength, times 20 (max 24)
/// - share of high-volume touches (max 15)
/// - share of touches followed by a strong bounce (max 15)
pub fn touch_quality_score(analysis: &TouchAnalysis) -> f64 {
    let touches = analysis.touch_count();
    if touches == 0 || analysis.candle_count == 0 {
        return 0.0;
    }
    let n = touches as f64;

    let density =
        (n / analysis.candle_count as f64 * 100.0 * 3.0).min(Q_DENSITY_CAP);
    let body_share = (analysis.body_count + analysis.exact_count) as f64 / n * Q_BODY_SHARE;
    let strength = (analysis.average_strength() * 20.0).min(Q_STRENGTH_CAP);
    let volume = analysis.high_volume_count as f64 / n * Q_VOLUME_SHARE;
    let bounce = analysis.strong_bounce_count as f64 / n * Q_BOUNCE_SHARE;

    (density + body_share + strength + volume + bounce).clamp(0.0, 100.0)
}

/// Generic confidence of a touch analysis, in [0, 1].
///
/// `0.4 * quality/100 + 0.3 * volume_weighted_strength + 0.2 * min(touches/10, 1)
///  + 0.1 * strong_bounces/touches`
pub fn touch_confidence(analysis: &TouchAnalysis) -> f64 {
    let touches = analysis.touch_count();
    if touches == 0 {
        return 0.0;
    }
    let n = touches as f64;

    let score = 0.4 * analysis.touch_quality_score / 100.0
        + 0.3 * analysis.volume_weighted_strength
        + 0.2 * (n / 10.0).min(1.0)
        + 0.1 * analysis.strong_bounce_count as f64 / n;

    score.clamp(0.0, 1.0)
}

/// Line strength in [0, 1]: mostly volume-weighted touch strength, partly touch count.
pub fn line_strength(analysis: &TouchAnalysis) -> f64 {
    if !analysis.has_touches() {
        return 0.0;
    }
    let strength = (analysis.volume_weighted_strength / 1.5).min(1.0);
    let count = (analysis.touch_count() as f64 / 10.0).min(1.0);
    (strength * 0.6 + count * 0.4).clamp(0.0, 1.0)
}

pub fn quality_metrics(analysis: &TouchAnalysis) -> QualityMetrics {
    let solid = (analysis.body_count + analysis.exact_count) as f64;
    QualityMetrics {
        // All-wick levels report the raw wick count
        wick_body_ratio: ratio_or(analysis.wick_count as f64, solid, analysis.wick_count as f64),
        volume_confirmation: analysis.volume_confirmation_ratio(),
        bounce_confirmation: analysis.bounce_confirmation_ratio(),
        overall_quality: analysis.touch_quality_score,
    }
}

// Trendline candidate pre-score weights
const W_TIME: f64 = 0.5;
const W_VOLUME: f64 = 0.3;
const W_RECENCY: f64 = 0.2;
const RECENCY_BONUS: f64 = 1.2;

/// Volume weight of a trendline anchor point: `volume / average`, capped at 2.
pub fn endpoint_volume_weight(volume: f64, average_volume: f64) -> f64 {
    ratio_or(volume, average_volume, 1.0).clamp(0.0, 2.0)
}

/// Heuristic score used to keep only the most promising swing pairs before fitting.
pub fn trendline_candidate_score(span_bars: usize, volume_score: f64, is_recent: bool) -> f64 {
    let time_span_score = (span_bars as f64 / 50.0).min(2.0);
    let recency_bonus = if is_recent { RECENCY_BONUS } else { 1.0 };
    time_span_score * W_TIME + volume_score * W_VOLUME + recency_bonus * W_RECENCY
}

// Trendline confidence weights (sum to 1)
const W_TOUCH: f64 = 0.25;
const W_R2: f64 = 0.3;
const W_TOUCHES: f64 = 0.15;
const W_RECENT: f64 = 0.1;
const W_MTF: f64 = 0.1;
const W_PATTERN: f64 = 0.05;
const W_ANGLE: f64 = 0.05;

/// Touch count at which the touch-count factor saturates.
const TOUCHES_FOR_FULL_SCORE: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendlineConfidenceInput {
    /// `touch_confidence` of the line's merged touch analysis.
    pub touch_confidence: f64,
    pub r_squared: f64,
    pub touch_count: usize,
    pub is_recent: bool,
    pub multi_timeframe_confirmation: bool,
    pub pattern_alignment: bool,
    /// Slope in percent of price per bar.
    pub slope_pct_per_bar: f64,
}

/// Confidence of an accepted trendline, in [0, 1].
///
/// Every factor is non-decreasing in its input, so a better fit, more touches, recent
/// activity, or confirmation on another timeframe never lowers the result.
pub fn trendline_confidence(input: &TrendlineConfidenceInput) -> f64 {
    let angle = input.slope_pct_per_bar.abs();
    let angle_score = if angle.is_finite() { 1.0 / (1.0 + angle) } else { 0.0 };
    let flag = |b: bool| if b { 1.0 } else { 0.0 };

    let score = input.touch_confidence.clamp(0.0, 1.0) * W_TOUCH
        + input.r_squared.clamp(0.0, 1.0) * W_R2
        + (input.touch_count as f64 / TOUCHES_FOR_FULL_SCORE).min(1.0) * W_TOUCHES
        + flag(input.is_recent) * W_RECENT
        + flag(input.multi_timeframe_confirmation) * W_MTF
        + flag(input.pattern_alignment) * W_PATTERN
        + angle_score * W_ANGLE;

    score.clamp(0.0, 1.0)
}

/// Rising support and falling resistance follow the pattern they describe.
pub fn pattern_alignment(role: LevelType, slope: f64) -> bool {
    match role {
        LevelType::Support => slope > 0.0,
        LevelType::Resistance => slope < 0.0,
    }
}

pub fn classify_priority(
    confidence: f64,
    touch_count: usize,
    is_recent: bool,
    multi_timeframe_confirmation: bool,
    high_threshold: f64,
    min_threshold: f64,
) -> TrendlinePriority {
    if confidence >= high_threshold && touch_count >= 5 && is_recent && multi_timeframe_confirmation
    {
        TrendlinePriority::High
    } else if confidence >= min_threshold && touch_count >= 3 {
        TrendlinePriority::Medium
    } else {
        TrendlinePriority::Low
    }
}
