// Derived models produced by the analysis pipeline.
// Created fresh per detection call; nothing here holds state between calls.

pub mod detection;
pub mod line;
pub mod swing;
pub mod touch;
pub mod zone;

// Re-export key types for convenience
pub use detection::{CrossTimeframeValidation, DetectionResult, DetectionStats};
pub use line::{
    EnhancedLine, LineGeometry, LineType, QualityMetrics, TrendDirection, TrendlineCoordinates,
    TrendlinePriority,
};
pub use swing::{SwingKind, SwingPoint};
pub use touch::{BounceDirection, LevelType, TouchAnalysis, TouchPoint, TouchType};
pub use zone::{ConfluenceZone, PriceRange, ZoneType};
