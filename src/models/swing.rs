use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum SwingKind {
    Peak,   // Strict local high
    Trough, // Strict local low
}

/// A local extremum found by the swing point detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    /// Index into the candle series the point was detected in.
    pub index: usize,
    pub time: i64,
    pub price: f64,
    pub kind: SwingKind,
}
