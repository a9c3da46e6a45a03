use crate::domain::Candle;
use crate::models::{SwingKind, SwingPoint};

/// Finds strict local highs and lows using a symmetric window of `lookback` bars on each side.
#[derive(Debug, Clone, Copy)]
pub struct SwingPointDetector {
    lookback: usize,
}

impl SwingPointDetector {
    pub fn new(lookback: usize) -> Self {
        Self { lookback }
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Minimum series length that can contain a swing point.
    pub fn min_candles(&self) -> usize {
        self.lookback.saturating_mul(2).saturating_add(1)
    }

    /// All peaks and troughs ordered by index (a peak sorts before a trough on the same bar).
    ///
    /// Series shorter than `2 * lookback + 1` yield no points; so does a zero lookback.
    pub fn detect(&self, candles: &[Candle]) -> Vec<SwingPoint> {
        let mut points = self.peaks(candles);
        points.extend(self.troughs(candles));
        points.sort_by_key(|p| (p.index, p.kind == SwingKind::Trough));
        points
    }

    pub fn peaks(&self, candles: &[Candle]) -> Vec<SwingPoint> {
        self.scan(candles, SwingKind::Peak)
    }

    pub fn troughs(&self, candles: &[Candle]) -> Vec<SwingPoint> {
        self.scan(candles, SwingKind::Trough)
    }

    fn scan(&self, candles: &[Candle], kind: SwingKind) -> Vec<SwingPoint> {
        if self.lookback == 0 || candles.len() < self.min_candles() {
            return Vec::new();
        }

        let price_of = |c: &Candle| match kind {
            SwingKind::Peak => c.high,
            SwingKind::Trough => c.low,
        };
        // `a` beats `b` when it is strictly more extreme in the direction of `kind`
        let beats = |a: f64, b: f64| match kind {
            SwingKind::Peak => a > b,
            SwingKind::Trough => a < b,
        };

        (self.lookback..candles.len() - self.lookback)
            .filter_map(|i| {
                let center = price_of(&candles[i]);
                let window = &candles[i - self.lookback..=i + self.lookback];
                let is_extreme = window
                    .iter()
                    .enumerate()
                    .filter(|(offset, _)| *offset != self.lookback)
                    .all(|(_, c)| beats(center, price_of(c)));

                is_extreme.then(|| SwingPoint {
                    index: i,
                    time: candles[i].time,
                    price: center,
                    kind,
                })
            })
            .collect()
    }
}
