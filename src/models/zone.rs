use serde::{Deserialize, Serialize};

use crate::models::line::EnhancedLine;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub center: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            center: (min + max) / 2.0,
        }
    }

    /// Window of `width_percent` total width centred on `price`.
    pub fn around(price: f64, width_percent: f64) -> Self {
        let half = price * width_percent / 200.0;
        Self::new(price - half, price + half)
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }

    pub fn overlaps(&self, other: &PriceRange) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ZoneType {
    Support,
    Resistance,
    Pivot, // Holds both support and resistance levels
}

/// A price band where several accepted levels cluster together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfluenceZone {
    pub price_range: PriceRange,
    /// Sum of member level strengths.
    pub strength: f64,
    pub timeframe_count: usize,
    pub supporting_timeframes: Vec<String>,
    pub levels: Vec<EnhancedLine>,
    pub zone_type: ZoneType,
}

impl ConfluenceZone {
    pub fn contains(&self, price: f64) -> bool {
        self.price_range.contains(price)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_range_window_and_overlap() {
        let a = PriceRange::around(100.0, 1.0);
        assert!((a.min - 99.5).abs() < 1e-12);
        assert!((a.max - 100.5).abs() < 1e-12);
        assert_eq!(a.center, 100.0);

        let b = PriceRange::around(100.9, 1.0);
        let c = PriceRange::around(102.0, 1.0);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.contains(100.5));
        assert!((a.width() - 1.0).abs() < 1e-12, "1% of 100 wide");
    }
}
