use serde::{Deserialize, Serialize};

/// Which side of price a level sits on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LevelType {
    Support,
    Resistance,
}

impl LevelType {
    /// The direction price is expected to move after respecting a level of this type.
    pub fn expected_bounce(&self) -> BounceDirection {
        match self {
            LevelType::Support => BounceDirection::Up,
            LevelType::Resistance => BounceDirection::Down,
        }
    }
}

/// How deep into the candle the level was reached. Ordered from weakest to strongest.
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
pub enum TouchType {
    Wick,
    Body,
    Exact,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BounceDirection {
    Up,
    Down,
}

/// A single candle's interaction with a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchPoint {
    /// Level price at the touching candle (constant for horizontal levels).
    pub price: f64,
    pub time: i64,
    /// Index into the candle series the touch was found in.
    pub index: usize,
    pub level_type: LevelType,
    pub touch_type: TouchType,
    pub strength: f64,
    pub volume: f64,
    pub volume_ratio: f64,
    pub bounce_strength: Option<f64>,
    pub bounce_direction: Option<BounceDirection>,
    /// Percent change in close from the touch to the end of the look-forward window.
    pub price_movement: Option<f64>,
}

impl TouchPoint {
    /// Returns this touch with strength scaled for above-threshold volume.
    pub fn with_volume_boost(self, threshold_multiplier: f64) -> Self {
        if self.volume_ratio > threshold_multiplier {
            let boost = 1.0 + (self.volume_ratio - 1.0) * 0.2;
            Self {
                strength: self.strength * boost,
                ..self
            }
        } else {
            self
        }
    }

    /// Returns this touch with its post-touch reaction recorded.
    ///
    /// `max_bounce_pct` is the largest move (percent of level) in the expected direction within
    /// the look-forward window. It only counts, and only boosts strength, above `threshold_pct`.
    pub fn with_bounce(
        self,
        max_bounce_pct: f64,
        threshold_pct: f64,
        price_movement: Option<f64>,
    ) -> Self {
        if max_bounce_pct > threshold_pct {
            Self {
                strength: self.strength * (1.0 + (max_bounce_pct / 100.0) * 0.5),
                bounce_strength: Some(max_bounce_pct),
                bounce_direction: Some(self.level_type.expected_bounce()),
                price_movement,
                ..self
            }
        } else {
            Self {
                price_movement,
                ..self
            }
        }
    }

    pub fn is_body_or_exact(&self) -> bool {
        matches!(self.touch_type, TouchType::Body | TouchType::Exact)
    }

    pub fn has_strong_bounce(&self) -> bool {
        self.bounce_strength.is_some()
    }

    pub fn is_high_volume(&self, threshold_multiplier: f64) -> bool {
        self.volume_ratio > threshold_multiplier
    }
}

/// Aggregate touch statistics for one level over one (or several merged) candle series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchAnalysis {
    pub price_level: f64,
    pub level_type: LevelType,
    /// Candles scanned to produce this analysis (summed when merged across timeframes).
    pub candle_count: usize,
    pub touch_points: Vec<TouchPoint>,
    pub average_volume: f64,
    pub wick_count: usize,
    pub body_count: usize,
    pub exact_count: usize,
    pub strong_bounce_count: usize,
    pub high_volume_count: usize,
    /// Always within [0, 100].
    pub touch_quality_score: f64,
    pub volume_weighted_strength: f64,
}

impl TouchAnalysis {
    pub fn empty(price_level: f64, level_type: LevelType, candle_count: usize) -> Self {
        Self {
            price_level,
            level_type,
            candle_count,
            touch_points: Vec::new(),
            average_volume: 0.0,
            wick_count: 0,
            body_count: 0,
            exact_count: 0,
            strong_bounce_count: 0,
            high_volume_count: 0,
            touch_quality_score: 0.0,
            volume_weighted_strength: 0.0,
        }
    }

    pub fn touch_count(&self) -> usize {
        self.touch_points.len()
    }

    pub fn has_touches(&self) -> bool {
        !self.touch_points.is_empty()
    }

    pub fn average_strength(&self) -> f64 {
        if self.touch_points.is_empty() {
            return 0.0;
        }
        self.touch_points.iter().map(|t| t.strength).sum::<f64>() / self.touch_count() as f64
    }

    /// Share of touches (0-1) with above-threshold volume.
    pub fn volume_confirmation_ratio(&self) -> f64 {
        self.share(self.high_volume_count)
    }

    /// Share of touches (0-1) followed by a strong bounce.
    pub fn bounce_confirmation_ratio(&self) -> f64 {
        self.share(self.strong_bounce_count)
    }

    fn share(&self, count: usize) -> f64 {
        if self.touch_points.is_empty() {
            0.0
        } else {
            count as f64 / self.touch_count() as f64
        }
    }
}
