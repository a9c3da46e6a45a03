// Detection algorithms, leaves first: swing points, touches, regression, scoring,
// cross-timeframe aggregation, confluence zones, trendline search.
pub mod confidence;
pub mod confluence;
pub mod multi_timeframe;
pub mod regression;
pub mod swing_points;
pub mod touch_points;
pub mod trendlines;

// Re-export commonly used types
pub use multi_timeframe::{ClusteredLevel, LevelCluster, MultiTimeframeAggregator};
pub use regression::{RegressionResult, least_squares};
pub use swing_points::SwingPointDetector;
pub use touch_points::TouchPointAnalyzer;
pub use trendlines::{FittedTrendline, TrendlineFinder};
