use std::cmp::Ordering;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::analysis::confidence::{endpoint_volume_weight, trendline_candidate_score};
use crate::analysis::regression::{RegressionResult, least_squares};
use crate::config::TrendlineConfig;
use crate::config::debug::PRINT_TRENDLINE_CANDIDATES;
use crate::domain::TimeframeSeries;
use crate::error::ConfigError;
use crate::models::{
    LevelType, SwingKind, SwingPoint, TrendDirection, TrendlineCoordinates, TrendlinePriority,
};
use crate::utils::maths_utils::{mean_or_zero, pct_distance, ratio_or};

/// Slopes smaller than this (percent of price per bar) count as flat.
const FLAT_SLOPE_PCT: f64 = 0.01;

/// A pair of same-kind swing points that may anchor a trendline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendlineCandidate {
    pub role: LevelType,
    pub start: SwingPoint,
    pub end: SwingPoint,
    pub score: f64,
}

impl TrendlineCandidate {
    pub fn span_bars(&self) -> usize {
        self.end.index - self.start.index
    }
}

/// A regression line that passed the fit gates, not yet scored against touches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedTrendline {
    pub source_timeframe: String,
    pub role: LevelType,
    pub start_time: i64,
    pub end_time: i64,
    /// Regression x-axis origin: `x = time - anchor_time` in seconds.
    pub anchor_time: i64,
    pub regression: RegressionResult,
    pub slope_pct_per_bar: f64,
    pub fit_points: usize,
    /// Ends within `recent_bars` of the latest candle of its timeframe.
    pub is_recent: bool,
}

impl FittedTrendline {
    pub fn price_at(&self, time: i64) -> f64 {
        self.regression.predict((time - self.anchor_time) as f64)
    }

    pub fn direction(&self) -> TrendDirection {
        if self.slope_pct_per_bar.abs() < FLAT_SLOPE_PCT {
            TrendDirection::Flat
        } else if self.regression.slope > 0.0 {
            TrendDirection::Up
        } else {
            TrendDirection::Down
        }
    }

    pub fn coordinates(&self, priority: TrendlinePriority) -> TrendlineCoordinates {
        TrendlineCoordinates {
            start_time: self.start_time,
            start_price: self.price_at(self.start_time),
            end_time: self.end_time,
            end_price: self.price_at(self.end_time),
            anchor_time: self.anchor_time,
            slope: self.regression.slope,
            intercept: self.regression.intercept,
            r_squared: self.regression.r_squared,
            slope_pct_per_bar: self.slope_pct_per_bar,
            direction: self.direction(),
            role: self.role,
            priority,
            source_timeframe: self.source_timeframe.clone(),
        }
    }

    /// Same role, and projections agree within `tolerance_percent` both where the two lines
    /// start overlapping and at `latest_time`.
    pub fn is_duplicate_of(&self, other: &FittedTrendline, latest_time: i64, tolerance_percent: f64) -> bool {
        if self.role != other.role {
            return false;
        }
        let overlap_start = self.start_time.max(other.start_time);
        [overlap_start, latest_time].iter().all(|&t| {
            pct_distance(self.price_at(t), other.price_at(t)) <= tolerance_percent
        })
    }
}

/// Outcome of the trendline search on one timeframe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendlineSearch {
    /// Pre-scored candidates that were fitted.
    pub considered: usize,
    pub lines: Vec<FittedTrendline>,
}

/// Pairs swing points into trendline candidates and fits the best of them.
#[derive(Debug, Clone)]
pub struct TrendlineFinder {
    config: TrendlineConfig,
}

impl TrendlineFinder {
    pub fn new(config: TrendlineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrendlineConfig {
        &self.config
    }

    /// Support lines through troughs and resistance lines through peaks.
    pub fn search(&self, series: &TimeframeSeries, swings: &[SwingPoint]) -> TrendlineSearch {
        let mut result = TrendlineSearch::default();
        for role in [LevelType::Support, LevelType::Resistance] {
            let candidates = self.candidates(series, swings, role);
            result.considered += candidates.len();
            result.lines.extend(
                candidates
                    .iter()
                    .filter_map(|c| self.fit_candidate(series, swings, c)),
            );
        }
        result
    }

    /// The `top_candidates` best-scoring swing pairs for `role`.
    ///
    /// Only the most recent `max_swing_points` swings of the matching kind are paired, and
    /// pairs must be at least `min_timespan_bars` apart.
    pub fn candidates(
        &self,
        series: &TimeframeSeries,
        swings: &[SwingPoint],
        role: LevelType,
    ) -> Vec<TrendlineCandidate> {
        let kind = swing_kind_for(role);
        let mut points: Vec<&SwingPoint> = swings.iter().filter(|s| s.kind == kind).collect();
        points.sort_by_key(|s| s.index);
        let points = &points[points.len().saturating_sub(self.config.max_swing_points)..];

        let volumes: Vec<f64> = series.candles.iter().map(|c| c.volume).collect();
        let average_volume = mean_or_zero(&volumes);
        let volume_at = |index: usize| series.candles.get(index).map_or(0.0, |c| c.volume);
        let last_index = series.len().saturating_sub(1);

        let mut candidates: Vec<TrendlineCandidate> = points
            .iter()
            .tuple_combinations()
            .filter(|(a, b)| b.index >= a.index.saturating_add(self.config.min_timespan_bars))
            .map(|(a, b)| {
                let volume_score = (endpoint_volume_weight(volume_at(a.index), average_volume)
                    + endpoint_volume_weight(volume_at(b.index), average_volume))
                    / 2.0;
                let is_recent = last_index.saturating_sub(b.index) < self.config.recent_bars;
                TrendlineCandidate {
                    role,
                    start: **a,
                    end: **b,
                    score: trendline_candidate_score(b.index - a.index, volume_score, is_recent),
                }
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.start.index.cmp(&b.start.index))
                .then(a.end.index.cmp(&b.end.index))
        });
        candidates.truncate(self.config.top_candidates);
        candidates
    }

    /// Fits a regression through the candidate's anchors and every same-kind swing between
    /// them lying within `point_tolerance_percent` of the anchor line.
    ///
    /// Returns `None` if too few points qualify, the fit is below `r_squared_threshold`, or
    /// the slope exceeds `max_trendline_slope` percent per bar.
    pub fn fit_candidate(
        &self,
        series: &TimeframeSeries,
        swings: &[SwingPoint],
        candidate: &TrendlineCandidate,
    ) -> Option<FittedTrendline> {
        let (start, end) = (candidate.start, candidate.end);
        let anchor_slope = ratio_or(end.price - start.price, (end.time - start.time) as f64, 0.0);
        let anchor_line = |t: i64| start.price + anchor_slope * (t - start.time) as f64;

        let points: Vec<(f64, f64)> = swings
            .iter()
            .filter(|s| s.kind == start.kind && s.index >= start.index && s.index <= end.index)
            .filter(|s| pct_distance(s.price, anchor_line(s.time)) <= self.config.point_tolerance_percent)
            .map(|s| ((s.time - start.time) as f64, s.price))
            .collect();

        if points.len() < self.config.min_trendline_points {
            return None;
        }

        let regression = least_squares(&points);
        let prices: Vec<f64> = points.iter().map(|p| p.1).collect();
        let mean_price = mean_or_zero(&prices);
        let slope_pct_per_bar = ratio_or(regression.slope * series.bar_secs(), mean_price, 0.0) * 100.0;

        let accepted = regression.r_squared >= self.config.r_squared_threshold
            && slope_pct_per_bar.abs() <= self.config.max_trendline_slope;

        if cfg!(debug_assertions) && PRINT_TRENDLINE_CANDIDATES {
            log::info!(
                "{} {} candidate {}..{} (score {:.3}): {} points, r2 {:.3}, slope {:.4}%/bar -> {}",
                series.label,
                candidate.role,
                start.index,
                end.index,
                candidate.score,
                points.len(),
                regression.r_squared,
                slope_pct_per_bar,
                if accepted { "fitted" } else { "rejected" }
            );
        }

        let last_index = series.len().saturating_sub(1);
        accepted.then(|| FittedTrendline {
            source_timeframe: series.label.clone(),
            role: candidate.role,
            start_time: start.time,
            end_time: end.time,
            anchor_time: start.time,
            regression,
            slope_pct_per_bar,
            fit_points: points.len(),
            is_recent: last_index.saturating_sub(end.index) < self.config.recent_bars,
        })
    }
}

fn swing_kind_for(role: LevelType) -> SwingKind {
    match role {
        LevelType::Support => SwingKind::Trough,
        LevelType::Resistance => SwingKind::Peak,
    }
}

/// Orders fitted lines for deterministic output: start time, then slope.
pub fn compare_fits(a: &FittedTrendline, b: &FittedTrendline) -> Ordering {
    a.start_time
        .cmp(&b.start_time)
        .then_with(|| a.regression.slope.total_cmp(&b.regression.slope))
        .then_with(|| a.source_timeframe.cmp(&b.source_timeframe))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::swing_points::SwingPointDetector;
    use crate::config::DEFAULT_TRENDLINE;
    use crate::test_support::{flat_series, snapshot, zigzag_series};

    fn series_and_swings(candles: Vec<crate::domain::Candle>) -> (TimeframeSeries, Vec<SwingPoint>) {
        let series = snapshot("TEST", vec![("1h", candles)])
            .prepared_timeframes()
            .remove(0);
        let swings = SwingPointDetector::new(3).detect(&series.candles);
        (series, swings)
    }

    fn finder(config: TrendlineConfig) -> TrendlineFinder {
        TrendlineFinder::new(config).expect("valid trendline config")
    }

    #[test]
    fn test_uptrend_troughs_fit_rising_support() {
        let (series, swings) = series_and_swings(zigzag_series(80, 100.0, 0.3, 3.0, 5));
        let search = finder(DEFAULT_TRENDLINE).search(&series, &swings);

        let support: Vec<&FittedTrendline> = search
            .lines
            .iter()
            .filter(|l| l.role == LevelType::Support)
            .collect();
        assert!(!support.is_empty(), "troughs are collinear");
        for line in support {
            assert!(line.regression.r_squared >= 0.9, "r2 {}", line.regression.r_squared);
            assert!(line.regression.slope > 0.0);
            assert_eq!(line.direction(), TrendDirection::Up);
            // 0.3 per hourly bar on a ~110 mean price
            assert!(line.slope_pct_per_bar > 0.2 && line.slope_pct_per_bar < 0.35);
            assert!(line.fit_points >= 3);
        }
        assert!(search.considered <= 2 * DEFAULT_TRENDLINE.top_candidates);
    }

    #[test]
    fn test_candidates_respect_span_and_cap() {
        let (series, swings) = series_and_swings(zigzag_series(80, 100.0, 0.3, 3.0, 5));
        let f = finder(TrendlineConfig {
            min_timespan_bars: 30,
            top_candidates: 3,
            ..DEFAULT_TRENDLINE
        });
        let candidates = f.candidates(&series, &swings, LevelType::Support);
        assert_eq!(candidates.len(), 3);
        for c in &candidates {
            assert!(c.span_bars() >= 30);
            assert_eq!(c.start.kind, SwingKind::Trough);
        }
        assert!(
            candidates.windows(2).all(|w| w[0].score >= w[1].score),
            "best first"
        );
    }

    #[test]
    fn test_steep_or_sparse_lines_are_rejected() {
        let (series, swings) = series_and_swings(zigzag_series(80, 100.0, 0.3, 3.0, 5));
        let flat_only = finder(TrendlineConfig {
            max_trendline_slope: 0.05,
            ..DEFAULT_TRENDLINE
        });
        assert!(flat_only.search(&series, &swings).lines.is_empty());

        let demanding = finder(TrendlineConfig {
            min_trendline_points: 20,
            ..DEFAULT_TRENDLINE
        });
        assert!(demanding.search(&series, &swings).lines.is_empty());
    }

    #[test]
    fn test_flat_series_has_no_candidates() {
        let (series, swings) = series_and_swings(flat_series(60, 100.0));
        let search = finder(DEFAULT_TRENDLINE).search(&series, &swings);
        assert_eq!(search.considered, 0);
        assert!(search.lines.is_empty());
    }

    #[test]
    fn test_duplicate_detection_and_coordinates() {
        let (series, swings) = series_and_swings(zigzag_series(80, 100.0, 0.3, 3.0, 5));
        let lines: Vec<FittedTrendline> = finder(DEFAULT_TRENDLINE)
            .search(&series, &swings)
            .lines
            .into_iter()
            .filter(|l| l.role == LevelType::Support)
            .collect();
        assert!(lines.len() >= 2, "several anchor pairs land on the same line");
        let latest = series.last_time().expect("non-empty");
        assert!(lines[0].is_duplicate_of(&lines[1], latest, 0.5));

        let resistance = FittedTrendline {
            role: LevelType::Resistance,
            ..lines[0].clone()
        };
        assert!(!lines[0].is_duplicate_of(&resistance, latest, 0.5));

        let coords = lines[0].coordinates(TrendlinePriority::Medium);
        assert!((coords.price_at(coords.end_time) - coords.end_price).abs() < 1e-9);
        assert_eq!(coords.priority, TrendlinePriority::Medium);
        assert_eq!(coords.source_timeframe, "1h");
    }
}
