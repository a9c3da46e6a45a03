use std::cmp::Ordering;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::analysis::confidence::{
    TrendlineConfidenceInput, classify_priority, line_strength, pattern_alignment,
    quality_metrics, touch_confidence, trendline_confidence,
};
use crate::analysis::confluence::find_confluence_zones;
use crate::analysis::multi_timeframe::merge_analyses;
use crate::analysis::trendlines::compare_fits;
use crate::analysis::{
    FittedTrendline, MultiTimeframeAggregator, SwingPointDetector, TouchPointAnalyzer,
    TrendlineFinder,
};
use crate::config::DetectionConfig;
use crate::config::debug::{PRINT_DETECTION_SUMMARY, PRINT_FILTER_REJECTIONS};
use crate::domain::{MultiTimeframeData, TimeframeSeries};
use crate::error::ConfigError;
use crate::models::{
    CrossTimeframeValidation, DetectionResult, EnhancedLine, LevelType, LineGeometry, LineType,
    SwingPoint, TouchAnalysis, TrendlinePriority,
};
use crate::utils::time_utils::epoch_sec_to_utc;

use super::filters::{AcceptanceFilter, FilterTally, Rejection};

/// Minimum timeframes touching a trendline for it to count as confirmed across timeframes.
const MTF_CONFIRMATION_TIMEFRAMES: usize = 2;

/// Runs the full detection pipeline over one multi-timeframe snapshot.
///
/// Holds only validated configuration and the components built from it, so one engine can
/// serve any number of concurrent `detect` calls.
#[derive(Debug, Clone)]
pub struct LineDetectionEngine {
    config: DetectionConfig,
    swing_detector: SwingPointDetector,
    analyzer: TouchPointAnalyzer,
    aggregator: MultiTimeframeAggregator,
    trendline_finder: TrendlineFinder,
}

/// What a candidate line is, before it is turned into an `EnhancedLine`.
#[derive(Debug, Clone)]
enum CandidateShape {
    Horizontal { price: f64 },
    Trendline { fit: FittedTrendline, priority: TrendlinePriority },
}

/// A candidate that passed every acceptance filter.
#[derive(Debug, Clone)]
struct AcceptedLine {
    shape: CandidateShape,
    analysis: TouchAnalysis,
    supporting_timeframes: Vec<String>,
    confidence: f64,
    strength: f64,
}

impl AcceptedLine {
    fn rank_score(&self) -> f64 {
        self.confidence * self.strength
    }

    fn fit(&self) -> Option<&FittedTrendline> {
        match &self.shape {
            CandidateShape::Trendline { fit, .. } => Some(fit),
            CandidateShape::Horizontal { .. } => None,
        }
    }

    // Best first; ties broken by geometry so the order never depends on scheduling
    fn compare(&self, other: &Self) -> Ordering {
        other
            .rank_score()
            .total_cmp(&self.rank_score())
            .then_with(|| match (&self.shape, &other.shape) {
                (CandidateShape::Horizontal { price: a }, CandidateShape::Horizontal { price: b }) => {
                    a.total_cmp(b)
                }
                (
                    CandidateShape::Trendline { fit: a, .. },
                    CandidateShape::Trendline { fit: b, .. },
                ) => compare_fits(a, b),
                (CandidateShape::Horizontal { .. }, _) => Ordering::Less,
                (_, CandidateShape::Horizontal { .. }) => Ordering::Greater,
            })
    }

    fn into_line(self, id: String, created_at: DateTime<Utc>) -> EnhancedLine {
        let level_type = self.analysis.level_type;
        let touches = self.analysis.touch_count();
        let timeframes = self.supporting_timeframes.join(", ");

        let (geometry, line_type, description) = match self.shape {
            CandidateShape::Horizontal { price } => {
                let line_type = match level_type {
                    LevelType::Support => LineType::Support,
                    LevelType::Resistance => LineType::Resistance,
                };
                let description =
                    format!("{level_type} at {price:.4} ({touches} touches on {timeframes})");
                (LineGeometry::Horizontal { price }, line_type, description)
            }
            CandidateShape::Trendline { fit, priority } => {
                let coords = fit.coordinates(priority);
                let description = format!(
                    "{} {} trendline {} -> {} ({:.4} -> {:.4}, r2 {:.2}, {} priority, {} touches on {})",
                    coords.direction,
                    coords.role,
                    epoch_sec_to_utc(coords.start_time),
                    epoch_sec_to_utc(coords.end_time),
                    coords.start_price,
                    coords.end_price,
                    coords.r_squared,
                    coords.priority,
                    touches,
                    timeframes
                );
                (LineGeometry::Trendline(coords), LineType::Trendline, description)
            }
        };

        EnhancedLine {
            id,
            geometry,
            line_type,
            confidence: self.confidence,
            strength: self.strength,
            touch_count: touches,
            supporting_timeframes: self.supporting_timeframes,
            quality_metrics: quality_metrics(&self.analysis),
            touch_analysis: self.analysis,
            description,
            created_at,
        }
    }
}

impl LineDetectionEngine {
    /// Validates `config` and builds the pipeline components from it.
    pub fn new(config: DetectionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let analyzer = TouchPointAnalyzer::new(config.touch.clone())?;
        let aggregator = MultiTimeframeAggregator::new(config.aggregation.clone(), analyzer.clone())?;
        let trendline_finder = TrendlineFinder::new(config.trendline.clone())?;

        Ok(Self {
            swing_detector: SwingPointDetector::new(config.swing_lookback),
            analyzer,
            aggregator,
            trendline_finder,
            config,
        })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detects horizontal levels, trendlines and confluence zones.
    ///
    /// Never fails: timeframes that are empty or shorter than one swing window contribute
    /// nothing, and a snapshot with no usable timeframe returns an empty result with zeroed
    /// statistics.
    pub fn detect(&self, data: &MultiTimeframeData) -> DetectionResult {
        let started = Instant::now();

        let min_candles = self.swing_detector.min_candles();
        let series: Vec<TimeframeSeries> = data
            .prepared_timeframes()
            .into_iter()
            .filter(|tf| tf.len() >= min_candles)
            .collect();
        if series.is_empty() {
            log::debug!(
                "{}: no timeframe has the {} candles needed for swing detection",
                data.symbol,
                min_candles
            );
            return DetectionResult::empty(&data.symbol);
        }

        let swings: Vec<Vec<SwingPoint>> = series
            .par_iter()
            .map(|tf| self.swing_detector.detect(&tf.candles))
            .collect();

        let filter = AcceptanceFilter::new(&self.config);
        let mut tally = FilterTally::default();

        let mut horizontal = self.horizontal_candidates(&series, &swings, &filter, &mut tally);
        horizontal.sort_by(AcceptedLine::compare);

        let mut trendlines = self.trendline_candidates(&series, &swings, &filter, &mut tally);
        trendlines.sort_by(AcceptedLine::compare);
        let latest_time = series.iter().filter_map(|tf| tf.last_time()).max().unwrap_or(0);
        let trendlines = self.dedupe_trendlines(trendlines, latest_time);

        let horizontal_lines: Vec<EnhancedLine> = horizontal
            .into_iter()
            .enumerate()
            .map(|(i, line)| line.into_line(format!("{}-h-{}", data.symbol, i + 1), data.fetched_at))
            .collect();
        let trendlines: Vec<EnhancedLine> = trendlines
            .into_iter()
            .enumerate()
            .map(|(i, line)| line.into_line(format!("{}-t-{}", data.symbol, i + 1), data.fetched_at))
            .collect();
        let confluence_zones = find_confluence_zones(&horizontal_lines, &self.config.aggregation);

        let final_lines = horizontal_lines.len() + trendlines.len();
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let detection_stats = tally.into_stats(final_lines, elapsed_ms);

        if cfg!(debug_assertions) && PRINT_DETECTION_SUMMARY {
            log::info!(
                "{}: {} candidates, {} passed touches, {} passed quality, {} lines ({} h / {} t), {} zones in {}ms",
                data.symbol,
                detection_stats.total_candidates,
                detection_stats.touch_filtered,
                detection_stats.quality_filtered,
                final_lines,
                horizontal_lines.len(),
                trendlines.len(),
                confluence_zones.len(),
                detection_stats.processing_time_ms
            );
        }

        DetectionResult {
            symbol: data.symbol.clone(),
            horizontal_lines,
            trendlines,
            confluence_zones,
            detection_stats,
        }
    }

    /// Cross-timeframe support for an arbitrary price, using the configured touch tolerance.
    pub fn validate_price(&self, data: &MultiTimeframeData, price: f64) -> CrossTimeframeValidation {
        self.aggregator.validate_price(&data.prepared_timeframes(), price)
    }

    /// Like `validate_price`, with a different touch tolerance (percent of price).
    pub fn validate_price_with_tolerance(
        &self,
        data: &MultiTimeframeData,
        price: f64,
        tolerance_percent: f64,
    ) -> Result<CrossTimeframeValidation, ConfigError> {
        let analyzer = self.analyzer.with_tolerance_percent(tolerance_percent)?;
        let aggregator = MultiTimeframeAggregator::new(self.config.aggregation.clone(), analyzer)?;
        Ok(aggregator.validate_price(&data.prepared_timeframes(), price))
    }

    fn horizontal_candidates(
        &self,
        series: &[TimeframeSeries],
        swings: &[Vec<SwingPoint>],
        filter: &AcceptanceFilter,
        tally: &mut FilterTally,
    ) -> Vec<AcceptedLine> {
        let clusters = self.aggregator.cluster_levels(swings);
        tally.add_considered(clusters.len());

        let levels: Vec<_> = clusters
            .par_iter()
            .filter_map(|cluster| self.aggregator.analyze_cluster(series, cluster))
            .collect();

        levels
            .into_iter()
            .filter_map(|level| {
                let confidence = touch_confidence(&level.analysis);
                let outcome =
                    filter.check(&level.analysis, confidence, level.supporting_timeframes.len());
                tally.record(&outcome);
                log_rejection("level", level.price, &outcome);
                outcome.ok()?;

                Some(AcceptedLine {
                    shape: CandidateShape::Horizontal { price: level.price },
                    strength: line_strength(&level.analysis),
                    analysis: level.analysis,
                    supporting_timeframes: level.supporting_timeframes,
                    confidence,
                })
            })
            .collect()
    }

    fn trendline_candidates(
        &self,
        series: &[TimeframeSeries],
        swings: &[Vec<SwingPoint>],
        filter: &AcceptanceFilter,
        tally: &mut FilterTally,
    ) -> Vec<AcceptedLine> {
        let searches: Vec<_> = series
            .par_iter()
            .zip(swings.par_iter())
            .map(|(tf, points)| self.trendline_finder.search(tf, points))
            .collect();
        tally.add_considered(searches.iter().map(|s| s.considered).sum());

        let fits: Vec<FittedTrendline> = searches.into_iter().flat_map(|s| s.lines).collect();
        let scored: Vec<(FittedTrendline, Vec<String>, TouchAnalysis)> = fits
            .into_par_iter()
            .map(|fit| {
                let (supporting, analysis) = self.trendline_touches(series, &fit);
                (fit, supporting, analysis)
            })
            .collect();

        scored
            .into_iter()
            .filter_map(|(fit, supporting_timeframes, analysis)| {
                let multi_timeframe_confirmation =
                    supporting_timeframes.len() >= MTF_CONFIRMATION_TIMEFRAMES;
                let confidence = trendline_confidence(&TrendlineConfidenceInput {
                    touch_confidence: touch_confidence(&analysis),
                    r_squared: fit.regression.r_squared,
                    touch_count: analysis.touch_count(),
                    is_recent: fit.is_recent,
                    multi_timeframe_confirmation,
                    pattern_alignment: pattern_alignment(fit.role, fit.regression.slope),
                    slope_pct_per_bar: fit.slope_pct_per_bar,
                });

                let outcome = filter.check(&analysis, confidence, supporting_timeframes.len());
                tally.record(&outcome);
                log_rejection("trendline", fit.price_at(fit.end_time), &outcome);
                outcome.ok()?;

                let priority = classify_priority(
                    confidence,
                    analysis.touch_count(),
                    fit.is_recent,
                    multi_timeframe_confirmation,
                    self.config.trendline.high_priority_confidence,
                    self.config.min_confidence,
                );
                Some(AcceptedLine {
                    shape: CandidateShape::Trendline { fit, priority },
                    strength: line_strength(&analysis),
                    analysis,
                    supporting_timeframes,
                    confidence,
                })
            })
            .collect()
    }

    /// Touches along a fitted line on every timeframe, from the line's start onwards.
    fn trendline_touches(
        &self,
        series: &[TimeframeSeries],
        fit: &FittedTrendline,
    ) -> (Vec<String>, TouchAnalysis) {
        let reference_price = fit.price_at(fit.end_time);
        let per_timeframe: Vec<(&str, TouchAnalysis)> = series
            .iter()
            .map(|tf| {
                let analysis = self.analyzer.analyze_line(
                    &tf.candles,
                    fit.start_time,
                    reference_price,
                    fit.role,
                    |t| fit.price_at(t),
                );
                (tf.label.as_str(), analysis)
            })
            .collect();

        let supporting = per_timeframe
            .iter()
            .filter(|(_, a)| a.has_touches())
            .map(|(label, _)| label.to_string())
            .collect();
        let analyses: Vec<TouchAnalysis> = per_timeframe.into_iter().map(|(_, a)| a).collect();
        let merged = merge_analyses(reference_price, fit.role, &analyses, &self.analyzer);
        (supporting, merged)
    }

    // Input is sorted best first, so the first of each duplicate group survives
    fn dedupe_trendlines(&self, sorted: Vec<AcceptedLine>, latest_time: i64) -> Vec<AcceptedLine> {
        let tolerance = self.config.trendline.dedupe_tolerance_percent;
        let mut kept: Vec<AcceptedLine> = Vec::with_capacity(sorted.len());

        for line in sorted {
            let duplicate = match line.fit() {
                Some(fit) => kept
                    .iter()
                    .filter_map(AcceptedLine::fit)
                    .any(|k| k.is_duplicate_of(fit, latest_time, tolerance)),
                None => false,
            };
            if !duplicate {
                kept.push(line);
            }
        }
        kept
    }
}

fn log_rejection(kind: &str, price: f64, outcome: &Result<(), Rejection>) {
    if cfg!(debug_assertions)
        && PRINT_FILTER_REJECTIONS
        && let Err(reason) = outcome
    {
        log::info!("Rejected {} at {:.4}: {}", kind, price, reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AggregationConfig, MAX_WINDOW_BARS};
    use crate::domain::{Candle, TimeframeData};
    use crate::models::TrendDirection;
    use crate::test_support::{HOUR, flat_series, fixed_time, respaced, snapshot, zigzag_series};
    use proptest::prelude::*;

    fn engine(config: DetectionConfig) -> LineDetectionEngine {
        LineDetectionEngine::new(config).expect("valid detection config")
    }

    fn single_timeframe_config() -> DetectionConfig {
        DetectionConfig {
            aggregation: AggregationConfig {
                min_timeframes: 1,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    // The same 94.8-105.2 range on a 1h and a 4h chart
    fn ranging_snapshot() -> MultiTimeframeData {
        snapshot(
            "RANGE",
            vec![
                ("1h", zigzag_series(80, 100.0, 0.0, 5.0, 5)),
                ("4h", respaced(&zigzag_series(60, 100.0, 0.0, 5.0, 4), 4 * HOUR)),
            ],
        )
    }

    #[test]
    fn test_invalid_config_fails_at_construction() {
        let mut config = DetectionConfig::default();
        config.touch.tolerance_percent = 0.0;
        assert!(LineDetectionEngine::new(config).is_err());

        let mut config = DetectionConfig::default();
        config.touch.body_weight = -1.0;
        assert!(LineDetectionEngine::new(config).is_err());

        let unbounded: [fn(&mut DetectionConfig); 3] = [
            |c| c.swing_lookback = usize::MAX,
            |c| c.touch.lookforward_bars = usize::MAX,
            |c| c.trendline.min_timespan_bars = usize::MAX,
        ];
        for set in unbounded {
            let mut config = DetectionConfig::default();
            set(&mut config);
            assert!(
                matches!(LineDetectionEngine::new(config), Err(ConfigError::TooLarge { .. })),
                "unbounded bar windows must be rejected up front"
            );
        }
    }

    #[test]
    fn test_widest_allowed_windows_still_detect() {
        let mut config = DetectionConfig::default();
        config.touch.lookforward_bars = MAX_WINDOW_BARS;
        config.trendline.min_timespan_bars = MAX_WINDOW_BARS;
        config.trendline.recent_bars = MAX_WINDOW_BARS;
        config.aggregation.level_type_lookback = MAX_WINDOW_BARS;
        let result = engine(config).detect(&ranging_snapshot());
        assert!(
            result.trendlines.is_empty(),
            "no swing pair spans {MAX_WINDOW_BARS} bars"
        );
        assert!(result.horizontal_lines.iter().all(|l| l.touch_analysis.strong_bounce_count == 0));

        let mut config = DetectionConfig::default();
        config.swing_lookback = MAX_WINDOW_BARS;
        let result = engine(config).detect(&ranging_snapshot());
        assert!(result.is_empty(), "series shorter than one swing window yield nothing");
    }

    #[test]
    fn test_insufficient_data_yields_empty_result() {
        let e = engine(DetectionConfig::default());

        let one = snapshot("ONE", vec![("1h", vec![Candle::new(0, 1.0, 1.0, 1.0, 1.0, 1.0)])]);
        let result = e.detect(&one);
        assert!(result.horizontal_lines.is_empty());
        assert!(result.trendlines.is_empty());
        assert_eq!(result.detection_stats, Default::default());

        // lookback 3 needs 7 candles
        let short = snapshot("SHORT", vec![("1h", zigzag_series(6, 100.0, 0.0, 5.0, 2))]);
        assert_eq!(e.detect(&short).detection_stats.final_lines, 0);

        let none = snapshot("NONE", vec![]);
        assert!(e.detect(&none).is_empty());
    }

    #[test]
    fn test_flat_series_yields_no_lines() {
        let data = snapshot(
            "FLAT",
            vec![
                ("1h", flat_series(100, 100.0)),
                ("4h", respaced(&flat_series(100, 100.0), 4 * HOUR)),
            ],
        );
        let result = engine(DetectionConfig::default()).detect(&data);
        assert!(result.is_empty(), "no swing points means no lines");
        assert_eq!(result.detection_stats.final_lines, 0);
        assert_eq!(result.detection_stats.total_candidates, 0);
    }

    #[test]
    fn test_uptrend_yields_rising_support_trendline() {
        let data = snapshot("UP", vec![("1h", zigzag_series(80, 100.0, 0.3, 3.0, 5))]);
        let result = engine(single_timeframe_config()).detect(&data);

        let support = result
            .trendlines
            .iter()
            .find(|l| l.level_type() == LevelType::Support)
            .expect("troughs of an uptrend form a support line");
        let coords = support.trendline().expect("trendline geometry");
        assert_eq!(support.line_type, LineType::Trendline);
        assert_eq!(coords.direction, TrendDirection::Up);
        assert!(coords.slope > 0.0);
        assert!(coords.r_squared >= 0.9, "r2 {}", coords.r_squared);
        assert!(support.touch_count >= 3);
        assert!(support.id.starts_with("UP-t-"));
        assert_eq!(support.created_at, fixed_time());

        let supports = result
            .trendlines
            .iter()
            .filter(|l| l.level_type() == LevelType::Support)
            .count();
        assert_eq!(supports, 1, "collinear anchor pairs collapse into one line");
    }

    #[test]
    fn test_range_yields_support_and_resistance_levels() {
        let result = engine(DetectionConfig::default()).detect(&ranging_snapshot());

        let support = result.nearest_support(100.0).expect("range low");
        let resistance = result.nearest_resistance(100.0).expect("range high");
        assert!((support.reference_price() - 94.8).abs() < 1e-6);
        assert!((resistance.reference_price() - 105.2).abs() < 1e-6);
        assert_eq!(support.line_type, LineType::Support);
        assert_eq!(resistance.line_type, LineType::Resistance);
        assert_eq!(support.supporting_timeframes, vec!["1h", "4h"]);

        let stats = result.detection_stats;
        assert!(stats.total_candidates >= 2);
        assert!(stats.touch_filtered <= stats.total_candidates);
        assert!(stats.quality_filtered <= stats.touch_filtered);
        assert_eq!(
            stats.final_lines,
            result.horizontal_lines.len() + result.trendlines.len()
        );
        assert!(
            result
                .horizontal_lines
                .windows(2)
                .all(|w| w[0].rank_score() >= w[1].rank_score()),
            "sorted best first"
        );
    }

    #[test]
    fn test_detection_is_deterministic() {
        let e = engine(DetectionConfig::default());
        let data = ranging_snapshot();
        let mut first = e.detect(&data);
        let mut second = e.detect(&data);
        first.detection_stats.processing_time_ms = 0;
        second.detection_stats.processing_time_ms = 0;
        assert_eq!(first, second);
    }

    #[test]
    fn test_validate_price_through_engine() {
        let e = engine(DetectionConfig::default());
        let data = ranging_snapshot();

        let validation = e.validate_price(&data, 94.8);
        assert_eq!(validation.supporting_timeframes.len(), 2);
        assert!(validation.validation_score > 0.0);

        // 96 is 1.3% above the range low: only a wide tolerance reaches it
        assert_eq!(e.validate_price(&data, 96.0).validation_score, 0.0);
        let wide = e
            .validate_price_with_tolerance(&data, 96.0, 1.5)
            .expect("valid tolerance");
        assert!(wide.validation_score > 0.0);
        assert!(e.validate_price_with_tolerance(&data, 96.0, -1.0).is_err());
    }

    #[test]
    fn test_analysis_depth_limits_history() {
        let full = zigzag_series(80, 100.0, 0.3, 3.0, 5);
        let data = snapshot("DEPTH", vec![])
            .with_timeframe("1h", TimeframeData::new(full).with_analysis_depth(5));
        let result = engine(single_timeframe_config()).detect(&data);
        assert!(result.is_empty(), "5 candles are too few for a swing window");
    }

    fn random_snapshot(slope: f64, amplitude: f64, half_period: usize, n: usize) -> MultiTimeframeData {
        snapshot(
            "PROP",
            vec![
                ("1h", zigzag_series(n, 100.0, slope, amplitude, half_period)),
                (
                    "4h",
                    respaced(&zigzag_series(n / 2, 100.0, slope * 2.0, amplitude, half_period), 4 * HOUR),
                ),
            ],
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn test_results_respect_bounds_and_filters(
            slope in -0.3f64..0.3,
            amplitude in 1.0f64..8.0,
            half_period in 3usize..8,
            n in 20usize..120,
            min_touch_count in 1usize..5,
            min_quality_score in 0.0f64..70.0,
        ) {
            let config = DetectionConfig {
                min_touch_count,
                min_quality_score,
                ..Default::default()
            };
            let result = engine(config.clone()).detect(&random_snapshot(slope, amplitude, half_period, n));

            for line in result.horizontal_lines.iter().chain(result.trendlines.iter()) {
                prop_assert!((0.0..=1.0).contains(&line.confidence), "confidence {}", line.confidence);
                prop_assert!((0.0..=1.0).contains(&line.strength));
                prop_assert!((0.0..=100.0).contains(&line.quality_metrics.overall_quality));
                prop_assert!((0.0..=100.0).contains(&line.touch_analysis.touch_quality_score));
                prop_assert!(line.touch_count >= config.min_touch_count);
                prop_assert!(line.quality_metrics.overall_quality >= config.min_quality_score);
                prop_assert!(line.confidence >= config.min_confidence);
                prop_assert!(line.supporting_timeframes.len() >= config.aggregation.min_timeframes);
            }
            let stats = result.detection_stats;
            prop_assert!(stats.quality_filtered <= stats.touch_filtered);
            prop_assert!(stats.touch_filtered <= stats.total_candidates);
        }

        #[test]
        fn test_repeated_detection_agrees(
            slope in -0.3f64..0.3,
            amplitude in 1.0f64..8.0,
            half_period in 3usize..8,
        ) {
            let e = engine(DetectionConfig::default());
            let data = random_snapshot(slope, amplitude, half_period, 90);
            let a = e.detect(&data);
            let b = e.detect(&data);
            prop_assert_eq!(&a.horizontal_lines, &b.horizontal_lines);
            prop_assert_eq!(&a.trendlines, &b.trendlines);
            prop_assert_eq!(&a.confluence_zones, &b.confluence_zones);
        }
    }
}
