use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::candle::Candle;
use crate::utils::TimeUtils;
use crate::utils::time_utils::median_spacing_secs;

fn default_weight() -> f64 {
    1.0
}

/// Candles for one interval, as delivered by the market-data collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeframeData {
    pub data: Vec<Candle>,
    /// Relative importance of this timeframe in cross-timeframe validation.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Number of most recent candles to analyse. `0` means all of them.
    #[serde(default)]
    pub analysis_depth: usize,
}

impl TimeframeData {
    pub fn new(data: Vec<Candle>) -> Self {
        Self {
            data,
            weight: default_weight(),
            analysis_depth: 0,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_analysis_depth(mut self, analysis_depth: usize) -> Self {
        self.analysis_depth = analysis_depth;
        self
    }
}

/// A snapshot of one symbol across several intervals, keyed by interval label (`1h`, `4h`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiTimeframeData {
    pub symbol: String,
    pub timeframes: BTreeMap<String, TimeframeData>,
    pub fetched_at: DateTime<Utc>,
}

impl MultiTimeframeData {
    pub fn new(symbol: impl Into<String>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframes: BTreeMap::new(),
            fetched_at,
        }
    }

    pub fn with_timeframe(mut self, label: impl Into<String>, data: TimeframeData) -> Self {
        self.timeframes.insert(label.into(), data);
        self
    }

    /// Sanitised, analysis-ready series ordered by interval length (then label).
    ///
    /// Invalid candles are dropped, the rest sorted by time with duplicate timestamps
    /// removed, and `analysis_depth` applied. Timeframes left with no candles are omitted.
    pub fn prepared_timeframes(&self) -> Vec<TimeframeSeries> {
        let mut prepared: Vec<TimeframeSeries> = self
            .timeframes
            .iter()
            .filter_map(|(label, tf)| TimeframeSeries::prepare(label, tf))
            .collect();

        prepared.sort_by(|a, b| {
            a.interval_secs
                .cmp(&b.interval_secs)
                .then_with(|| a.label.cmp(&b.label))
        });
        prepared
    }
}

/// A cleaned candle series for one timeframe, owned by the engine for one detection call.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeframeSeries {
    pub label: String,
    /// Bar length in seconds (from the label, or inferred from timestamps). `0` if unknown.
    pub interval_secs: i64,
    pub weight: f64,
    pub candles: Vec<Candle>,
}

impl TimeframeSeries {
    fn prepare(label: &str, tf: &TimeframeData) -> Option<Self> {
        let mut candles: Vec<Candle> = tf.data.iter().copied().filter(Candle::is_valid).collect();

        let dropped = tf.data.len() - candles.len();
        if dropped > 0 {
            log::warn!(
                "Timeframe {}: dropped {} invalid candle(s) out of {}",
                label,
                dropped,
                tf.data.len()
            );
        }

        candles.sort_by_key(|c| c.time);
        candles.dedup_by_key(|c| c.time);

        if tf.analysis_depth > 0 && candles.len() > tf.analysis_depth {
            candles.drain(..candles.len() - tf.analysis_depth);
        }

        if candles.is_empty() {
            return None;
        }

        let interval_secs = TimeUtils::interval_label_to_secs(label)
            .or_else(|| {
                let times: Vec<i64> = candles.iter().map(|c| c.time).collect();
                let spacing = median_spacing_secs(&times)?;
                log::debug!(
                    "Timeframe {}: interval taken from candle spacing ({}s, {})",
                    label,
                    spacing,
                    TimeUtils::interval_secs_to_string(spacing)
                );
                Some(spacing)
            })
            .unwrap_or(0);

        let weight = if tf.weight.is_finite() && tf.weight > 0.0 {
            tf.weight
        } else {
            1.0
        };

        Some(Self {
            label: label.to_string(),
            interval_secs,
            weight,
            candles,
        })
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last_time(&self) -> Option<i64> {
        self.candles.last().map(|c| c.time)
    }

    /// Bar length used to express slopes per bar. Falls back to one second.
    pub fn bar_secs(&self) -> f64 {
        self.interval_secs.max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candle(time: i64, price: f64) -> Candle {
        Candle::new(time, price, price + 1.0, price - 1.0, price, 10.0)
    }

    #[test]
    fn test_preparation_sorts_filters_and_truncates() {
        let raw = vec![
            candle(300, 13.0),
            candle(0, 10.0),
            Candle::new(100, f64::NAN, 1.0, 1.0, 1.0, 1.0),
            candle(200, 12.0),
            candle(200, 12.5),
            candle(100, 11.0),
        ];
        let data = MultiTimeframeData::new("TEST", Utc.timestamp_opt(0, 0).unwrap())
            .with_timeframe("5m", TimeframeData::new(raw).with_analysis_depth(3));

        let prepared = data.prepared_timeframes();
        assert_eq!(prepared.len(), 1);
        let times: Vec<i64> = prepared[0].candles.iter().map(|c| c.time).collect();
        assert_eq!(times, vec![100, 200, 300], "sorted, deduped, most recent 3 kept");
        assert_eq!(prepared[0].interval_secs, 300);
    }

    #[test]
    fn test_timeframes_ordered_by_interval_not_label() {
        let series = vec![candle(0, 10.0), candle(3600, 11.0)];
        let data = MultiTimeframeData::new("TEST", Utc.timestamp_opt(0, 0).unwrap())
            .with_timeframe("1d", TimeframeData::new(series.clone()))
            .with_timeframe("15m", TimeframeData::new(series.clone()))
            .with_timeframe("4h", TimeframeData::new(series.clone()))
            .with_timeframe("custom", TimeframeData::new(series).with_weight(-2.0));

        let labels: Vec<String> = data
            .prepared_timeframes()
            .into_iter()
            .map(|tf| tf.label)
            .collect();
        // "custom" infers its interval (3600s) from timestamps
        assert_eq!(labels, vec!["15m", "custom", "4h", "1d"]);
    }

    #[test]
    fn test_empty_timeframes_are_skipped_and_bad_weights_reset() {
        let data = MultiTimeframeData::new("TEST", Utc.timestamp_opt(0, 0).unwrap())
            .with_timeframe("1h", TimeframeData::new(Vec::new()))
            .with_timeframe("4h", TimeframeData::new(vec![candle(0, 5.0)]).with_weight(f64::NAN));
        let prepared = data.prepared_timeframes();
        assert_eq!(prepared.len(), 1);
        assert_eq!(prepared[0].weight, 1.0);
        assert_eq!(prepared[0].interval_secs, 4 * 3600);
    }
}
