// Domain types and value objects supplied by the caller
pub mod candle;
pub mod timeframe;

// Re-export commonly used types
pub use candle::{Candle, CandleType};
pub use timeframe::{MultiTimeframeData, TimeframeData, TimeframeSeries};
