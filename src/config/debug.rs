//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so release
//! builds remain quiet. Each flag is further gated by `cfg!(debug_assertions)`
//! at the call site.

/// Emit a one-line summary (candidates, filter counts, timing) after every detection call.
pub const PRINT_DETECTION_SUMMARY: bool = false;

/// Emit cross-timeframe clustering decisions (new cluster vs. merge).
pub const PRINT_CLUSTER_EVENTS: bool = false;

/// Emit every pre-scored trendline candidate and its regression fit.
pub const PRINT_TRENDLINE_CANDIDATES: bool = false;

/// Emit the reason each candidate level or trendline was rejected by the acceptance filters.
pub const PRINT_FILTER_REJECTIONS: bool = false;
