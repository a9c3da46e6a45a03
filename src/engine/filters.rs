// Acceptance filters applied to every candidate line, and the counters behind DetectionStats.

use crate::config::DetectionConfig;
use crate::models::{DetectionStats, TouchAnalysis};

/// Why a candidate was turned away. Variants are listed in the order the checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Rejection {
    TooFewTouches,
    LowQuality,
    NoVolumeConfirmation,
    NoBounceConfirmation,
    LowConfidence,
    TooFewTimeframes,
}

pub struct AcceptanceFilter<'a> {
    config: &'a DetectionConfig,
}

impl<'a> AcceptanceFilter<'a> {
    pub fn new(config: &'a DetectionConfig) -> Self {
        Self { config }
    }

    /// Runs the checks in order and reports the first failure.
    pub fn check(
        &self,
        analysis: &TouchAnalysis,
        confidence: f64,
        supporting_timeframes: usize,
    ) -> Result<(), Rejection> {
        let c = self.config;
        if analysis.touch_count() < c.min_touch_count {
            return Err(Rejection::TooFewTouches);
        }
        if analysis.touch_quality_score < c.min_quality_score {
            return Err(Rejection::LowQuality);
        }
        if c.require_volume_confirmation
            && analysis.volume_confirmation_ratio() < c.volume_confirmation_threshold
        {
            return Err(Rejection::NoVolumeConfirmation);
        }
        if c.require_bounce_confirmation
            && analysis.bounce_confirmation_ratio() < c.bounce_confirmation_threshold
        {
            return Err(Rejection::NoBounceConfirmation);
        }
        if confidence < c.min_confidence {
            return Err(Rejection::LowConfidence);
        }
        if supporting_timeframes < c.aggregation.min_timeframes {
            return Err(Rejection::TooFewTimeframes);
        }
        Ok(())
    }
}

/// Running counts for one detection call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterTally {
    pub considered: usize,
    pub touch_passed: usize,
    pub quality_passed: usize,
    pub accepted: usize,
}

impl FilterTally {
    /// Candidates that were generated, whether or not they reach the filters.
    pub fn add_considered(&mut self, count: usize) {
        self.considered += count;
    }

    pub fn record(&mut self, outcome: &Result<(), Rejection>) {
        match outcome {
            Err(Rejection::TooFewTouches) => {}
            Err(Rejection::LowQuality) => self.touch_passed += 1,
            Err(_) => {
                self.touch_passed += 1;
                self.quality_passed += 1;
            }
            Ok(()) => {
                self.touch_passed += 1;
                self.quality_passed += 1;
                self.accepted += 1;
            }
        }
    }

    pub fn into_stats(self, final_lines: usize, processing_time_ms: u64) -> DetectionStats {
        DetectionStats {
            total_candidates: self.considered,
            quality_filtered: self.quality_passed,
            touch_filtered: self.touch_passed,
            final_lines,
            processing_time_ms,
        }
    }
}
