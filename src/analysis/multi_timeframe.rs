use std::collections::BTreeSet;

use rayon::prelude::*;
use strum::IntoEnumIterator;

use crate::analysis::touch_points::{TouchPointAnalyzer, summarize_touches};
use crate::config::AggregationConfig;
use crate::config::debug::PRINT_CLUSTER_EVENTS;
use crate::domain::TimeframeSeries;
use crate::error::ConfigError;
use crate::models::{CrossTimeframeValidation, LevelType, SwingKind, SwingPoint, TouchAnalysis};
use crate::utils::maths_utils::{mean_or_zero, pct_distance};

/// One swing price that joined a cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterMember {
    /// Position of the source timeframe in the prepared series slice.
    pub timeframe: usize,
    pub price: f64,
    pub kind: SwingKind,
}

/// Swing prices from one or more timeframes that agree on a level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelCluster {
    price_sum: f64,
    pub members: Vec<ClusterMember>,
}

impl LevelCluster {
    fn new(member: ClusterMember) -> Self {
        Self {
            price_sum: member.price,
            members: vec![member],
        }
    }

    fn push(&mut self, member: ClusterMember) {
        self.price_sum += member.price;
        self.members.push(member);
    }

    /// Running average of the member prices.
    pub fn price(&self) -> f64 {
        self.price_sum / self.members.len() as f64
    }

    /// Distinct contributing timeframes, finest first.
    pub fn timeframes(&self) -> BTreeSet<usize> {
        self.members.iter().map(|m| m.timeframe).collect()
    }

    pub fn timeframe_count(&self) -> usize {
        self.timeframes().len()
    }

    pub fn trough_count(&self) -> usize {
        self.members
            .iter()
            .filter(|m| m.kind == SwingKind::Trough)
            .count()
    }
}

/// A consensus level with its merged touch evidence.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteredLevel {
    pub price: f64,
    pub level_type: LevelType,
    pub analysis: TouchAnalysis,
    /// Labels of contributing timeframes that actually touch the level.
    pub supporting_timeframes: Vec<String>,
}

/// Merges per-timeframe swing levels into consensus levels and validates prices across timeframes.
#[derive(Debug, Clone)]
pub struct MultiTimeframeAggregator {
    config: AggregationConfig,
    analyzer: TouchPointAnalyzer,
}

impl MultiTimeframeAggregator {
    pub fn new(config: AggregationConfig, analyzer: TouchPointAnalyzer) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, analyzer })
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Clusters swing prices across timeframes.
    ///
    /// `swings[i]` belongs to `series[i]`. Prices are visited in timeframe order, then index
    /// order; each joins the nearest cluster whose running average is within
    /// `price_tolerance_percent`, or starts a new one. Only clusters backed by at least
    /// `min_timeframes` distinct timeframes are returned, sorted by price.
    pub fn cluster_levels(&self, swings: &[Vec<SwingPoint>]) -> Vec<LevelCluster> {
        let mut clusters: Vec<LevelCluster> = Vec::new();

        for (timeframe, points) in swings.iter().enumerate() {
            for point in points {
                let member = ClusterMember {
                    timeframe,
                    price: point.price,
                    kind: point.kind,
                };
                let nearest = clusters
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (i, pct_distance(point.price, c.price())))
                    .filter(|(_, distance)| *distance <= self.config.price_tolerance_percent)
                    .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

                match nearest {
                    Some((i, _)) => clusters[i].push(member),
                    None => clusters.push(LevelCluster::new(member)),
                }
            }
        }

        let total = clusters.len();
        let mut accepted: Vec<LevelCluster> = clusters
            .into_iter()
            .filter(|c| c.timeframe_count() >= self.config.min_timeframes)
            .collect();
        accepted.sort_by(|a, b| a.price().total_cmp(&b.price()));

        if cfg!(debug_assertions) && PRINT_CLUSTER_EVENTS {
            log::info!(
                "Clustered swing levels: {} clusters, {} backed by >= {} timeframes",
                total,
                accepted.len(),
                self.config.min_timeframes
            );
        }

        accepted
    }

    /// Support if recent closes mostly sit above `price`, resistance if mostly below.
    ///
    /// Votes over the last `level_type_lookback` closes of `reference`. A tied vote
    /// falls back to the swing kinds that formed the cluster (troughs mean support).
    pub fn determine_level_type(
        &self,
        reference: &TimeframeSeries,
        price: f64,
        trough_majority: bool,
    ) -> LevelType {
        let recent = &reference.candles[reference
            .candles
            .len()
            .saturating_sub(self.config.level_type_lookback)..];
        let above = recent.iter().filter(|c| c.close > price).count();
        let below = recent.iter().filter(|c| c.close < price).count();

        if above > below {
            LevelType::Support
        } else if below > above {
            LevelType::Resistance
        } else if trough_majority {
            LevelType::Support
        } else {
            LevelType::Resistance
        }
    }

    /// Runs touch analysis for the cluster on every contributing timeframe and merges it.
    pub fn analyze_cluster(
        &self,
        series: &[TimeframeSeries],
        cluster: &LevelCluster,
    ) -> Option<ClusteredLevel> {
        let price = cluster.price();
        let contributing: Vec<&TimeframeSeries> = cluster
            .timeframes()
            .into_iter()
            .filter_map(|i| series.get(i))
            .collect();
        // Finest contributing timeframe has the most recent closes
        let reference = contributing.first()?;

        let troughs = cluster.trough_count();
        let trough_majority = troughs * 2 >= cluster.members.len();
        let level_type = self.determine_level_type(reference, price, trough_majority);

        let per_timeframe: Vec<(&str, TouchAnalysis)> = contributing
            .par_iter()
            .map(|tf| {
                (
                    tf.label.as_str(),
                    self.analyzer.analyze_level(&tf.candles, price, level_type),
                )
            })
            .collect();

        let supporting_timeframes = per_timeframe
            .iter()
            .filter(|(_, analysis)| analysis.has_touches())
            .map(|(label, _)| label.to_string())
            .collect();
        let analyses: Vec<TouchAnalysis> = per_timeframe.into_iter().map(|(_, a)| a).collect();

        Some(ClusteredLevel {
            price,
            level_type,
            analysis: merge_analyses(price, level_type, &analyses, &self.analyzer),
            supporting_timeframes,
        })
    }

    /// How strongly `price` is backed by touches on each timeframe.
    ///
    /// Each timeframe is checked as both support and resistance and the side with more
    /// touches counts. `validation_score` is `0.6 * weighted share of supporting timeframes
    /// + 0.4 * min(average strength / 1.5, 1)`.
    pub fn validate_price(&self, series: &[TimeframeSeries], price: f64) -> CrossTimeframeValidation {
        let empty = CrossTimeframeValidation {
            price,
            ..Default::default()
        };
        if series.is_empty() || !price.is_finite() || price <= 0.0 {
            return empty;
        }

        let best: Vec<TouchAnalysis> = series
            .par_iter()
            .map(|tf| {
                LevelType::iter()
                    .map(|lt| self.analyzer.analyze_level(&tf.candles, price, lt))
                    .fold(None, |best: Option<TouchAnalysis>, a| match best {
                        Some(b) if b.touch_count() >= a.touch_count() => Some(b),
                        _ => Some(a),
                    })
                    .unwrap_or_else(|| TouchAnalysis::empty(price, LevelType::Support, 0))
            })
            .collect();

        let supporting: Vec<(&TimeframeSeries, &TouchAnalysis)> = series
            .iter()
            .zip(best.iter())
            .filter(|(_, a)| a.has_touches())
            .collect();
        if supporting.is_empty() {
            return empty;
        }

        let total_weight: f64 = series.iter().map(|tf| tf.weight).sum();
        let supporting_weight: f64 = supporting.iter().map(|(tf, _)| tf.weight).sum();
        let share = if total_weight > 0.0 {
            supporting_weight / total_weight
        } else {
            0.0
        };

        let strengths: Vec<f64> = supporting
            .iter()
            .flat_map(|(_, a)| a.touch_points.iter().map(|t| t.strength))
            .collect();
        let average_strength = mean_or_zero(&strengths);

        let validation_score =
            (0.6 * share + 0.4 * (average_strength / 1.5).min(1.0)).clamp(0.0, 1.0);

        CrossTimeframeValidation {
            price,
            validation_score,
            supporting_timeframes: supporting.iter().map(|(tf, _)| tf.label.clone()).collect(),
            average_strength,
            touches_per_timeframe: supporting
                .iter()
                .map(|(tf, a)| (tf.label.clone(), a.touch_count()))
                .collect(),
        }
    }
}

/// Combines per-timeframe analyses of one level into a single analysis.
///
/// Touch lists are concatenated (ordered by time), candle counts summed, and the average
/// volume weighted by each series' candle count. Counts and scores are then recomputed
/// over the combined series.
pub fn merge_analyses(
    price_level: f64,
    level_type: LevelType,
    analyses: &[TouchAnalysis],
    analyzer: &TouchPointAnalyzer,
) -> TouchAnalysis {
    let candle_count: usize = analyses.iter().map(|a| a.candle_count).sum();
    let volume_sum: f64 = analyses
        .iter()
        .map(|a| a.average_volume * a.candle_count as f64)
        .sum();
    let average_volume = if candle_count > 0 {
        volume_sum / candle_count as f64
    } else {
        0.0
    };

    let mut touch_points: Vec<_> = analyses
        .iter()
        .flat_map(|a| a.touch_points.iter().cloned())
        .collect();
    touch_points.sort_by_key(|t| (t.time, t.index));

    summarize_touches(
        price_level,
        level_type,
        candle_count,
        average_volume,
        touch_points,
        analyzer.config(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::swing_points::SwingPointDetector;
    use crate::config::{DEFAULT_AGGREGATION, DEFAULT_TOUCH};
    use crate::domain::{Candle, TimeframeData};
    use crate::test_support::{HOUR, flat_series, respaced, snapshot, zigzag_series};

    fn aggregator(config: AggregationConfig) -> MultiTimeframeAggregator {
        let analyzer = TouchPointAnalyzer::new(DEFAULT_TOUCH).expect("valid touch config");
        MultiTimeframeAggregator::new(config, analyzer).expect("valid aggregation config")
    }

    fn swing(price: f64, kind: SwingKind) -> SwingPoint {
        SwingPoint {
            index: 0,
            time: 0,
            price,
            kind,
        }
    }

    // Same 95-105 range traded on a 1h and a 4h chart
    fn ranging_series() -> Vec<TimeframeSeries> {
        let hourly = zigzag_series(80, 100.0, 0.0, 5.0, 5);
        let four_hourly = respaced(&zigzag_series(60, 100.0, 0.0, 5.0, 4), 4 * HOUR);
        snapshot("TEST", vec![("1h", hourly), ("4h", four_hourly)]).prepared_timeframes()
    }

    #[test]
    fn test_clusters_need_distinct_timeframes() {
        let agg = aggregator(DEFAULT_AGGREGATION);
        let swings = vec![
            vec![swing(100.0, SwingKind::Trough), swing(110.0, SwingKind::Peak)],
            vec![swing(100.3, SwingKind::Trough), swing(120.0, SwingKind::Peak)],
        ];
        let clusters = agg.cluster_levels(&swings);
        assert_eq!(clusters.len(), 1, "only the 100 level appears on both timeframes");
        assert!((clusters[0].price() - 100.15).abs() < 1e-9);
        assert_eq!(clusters[0].timeframe_count(), 2);

        // Same-timeframe repeats do not count twice
        let one_tf = vec![vec![swing(100.0, SwingKind::Trough), swing(100.1, SwingKind::Trough)]];
        assert!(agg.cluster_levels(&one_tf).is_empty());
    }

    #[test]
    fn test_cluster_joins_nearest_running_average() {
        let agg = aggregator(AggregationConfig {
            min_timeframes: 1,
            ..DEFAULT_AGGREGATION
        });
        let swings = vec![vec![
            swing(100.0, SwingKind::Trough),
            swing(101.0, SwingKind::Peak),
            swing(100.6, SwingKind::Trough),
        ]];
        let clusters = agg.cluster_levels(&swings);
        assert_eq!(clusters.len(), 2);
        // 100.6 is 0.6% from 100 and 0.4% from 101
        assert_eq!(clusters[1].members.len(), 2);
        assert!((clusters[1].price() - 100.8).abs() < 1e-9);
    }

    #[test]
    fn test_level_type_majority_vote() {
        let agg = aggregator(DEFAULT_AGGREGATION);
        let series = snapshot("TEST", vec![("1h", flat_series(30, 100.0))]).prepared_timeframes();
        assert_eq!(agg.determine_level_type(&series[0], 95.0, false), LevelType::Support);
        assert_eq!(agg.determine_level_type(&series[0], 105.0, true), LevelType::Resistance);
        // All closes on the level: fall back to the swing kinds
        assert_eq!(agg.determine_level_type(&series[0], 100.0, true), LevelType::Support);
        assert_eq!(agg.determine_level_type(&series[0], 100.0, false), LevelType::Resistance);
    }

    #[test]
    fn test_range_extremes_become_consensus_levels() {
        let agg = aggregator(DEFAULT_AGGREGATION);
        let series = ranging_series();
        let detector = SwingPointDetector::new(3);
        let swings: Vec<Vec<SwingPoint>> = series.iter().map(|tf| detector.detect(&tf.candles)).collect();

        let clusters = agg.cluster_levels(&swings);
        assert_eq!(clusters.len(), 2, "range low and range high");

        let low = agg.analyze_cluster(&series, &clusters[0]).expect("low level");
        let high = agg.analyze_cluster(&series, &clusters[1]).expect("high level");
        assert!((low.price - 94.8).abs() < 1e-9);
        assert_eq!(low.level_type, LevelType::Support);
        assert_eq!(high.level_type, LevelType::Resistance);
        assert_eq!(low.supporting_timeframes, vec!["1h", "4h"]);
        assert_eq!(
            low.analysis.candle_count, 140,
            "candle counts add up across timeframes"
        );
        assert!(low.analysis.touch_count() >= 8);
        let times: Vec<i64> = low.analysis.touch_points.iter().map(|t| t.time).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]), "merged touches are time ordered");
    }

    #[test]
    fn test_merge_weights_average_volume_by_candle_count() {
        let analyzer = TouchPointAnalyzer::new(DEFAULT_TOUCH).expect("valid");
        let a = TouchAnalysis {
            average_volume: 100.0,
            ..TouchAnalysis::empty(100.0, LevelType::Support, 30)
        };
        let b = TouchAnalysis {
            average_volume: 400.0,
            ..TouchAnalysis::empty(100.0, LevelType::Support, 10)
        };
        let merged = merge_analyses(100.0, LevelType::Support, &[a, b], &analyzer);
        assert_eq!(merged.candle_count, 40);
        assert!((merged.average_volume - 175.0).abs() < 1e-9, "not the simple mean of 250");
        assert_eq!(merged.touch_quality_score, 0.0);
    }

    #[test]
    fn test_validate_price_scores_supported_level() {
        let agg = aggregator(DEFAULT_AGGREGATION);
        let series = ranging_series();

        let at_low = agg.validate_price(&series, 94.8);
        assert_eq!(at_low.supporting_timeframes, vec!["1h", "4h"]);
        assert!(at_low.validation_score > 0.6, "score {}", at_low.validation_score);
        assert!(at_low.validation_score <= 1.0);
        assert_eq!(at_low.touches_per_timeframe.len(), 2);

        let nowhere = agg.validate_price(&series, 250.0);
        assert_eq!(nowhere.validation_score, 0.0);
        assert!(nowhere.supporting_timeframes.is_empty());
        assert_eq!(agg.validate_price(&[], 100.0).validation_score, 0.0);
    }

    #[test]
    fn test_validate_price_uses_timeframe_weights() {
        let agg = aggregator(DEFAULT_AGGREGATION);
        let touching = zigzag_series(40, 100.0, 0.0, 5.0, 5);
        let elsewhere: Vec<Candle> = respaced(&flat_series(40, 300.0), 4 * HOUR);
        let data = snapshot("TEST", vec![])
            .with_timeframe("1h", TimeframeData::new(touching).with_weight(3.0))
            .with_timeframe("4h", TimeframeData::new(elsewhere).with_weight(1.0));
        let validation = agg.validate_price(&data.prepared_timeframes(), 94.8);
        assert_eq!(validation.supporting_timeframes, vec!["1h"]);
        // weighted share is 3/4; strength part is positive but below its 0.4 cap
        assert!(validation.validation_score > 0.45);
        assert!(validation.validation_score < 0.6 * 0.75 + 0.4 + 1e-9);
    }
}
