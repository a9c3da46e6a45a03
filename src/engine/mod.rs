pub mod core;
pub mod filters;

// Re-export key components
pub use core::LineDetectionEngine;
pub use filters::{AcceptanceFilter, FilterTally, Rejection};
