use argminmax::ArgMinMax;
use statrs::statistics::Statistics;

pub fn get_max(vec: &[f64]) -> Option<f64> {
    if vec.is_empty() {
        return None;
    }
    let max_index: usize = vec.argmax();
    Some(vec[max_index])
}

pub fn get_min(vec: &[f64]) -> Option<f64> {
    if vec.is_empty() {
        return None;
    }
    let min_index: usize = vec.argmin();
    Some(vec[min_index])
}

/// Arithmetic mean, or `0.0` for an empty slice (statrs returns NaN there).
pub fn mean_or_zero(vec: &[f64]) -> f64 {
    if vec.is_empty() {
        return 0.0;
    }
    vec.mean()
}

/// `numerator / denominator`, or `fallback` when the denominator is zero or not finite.
#[inline]
pub fn ratio_or(numerator: f64, denominator: f64, fallback: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        fallback
    } else {
        numerator / denominator
    }
}

/// Percentage change from `from` to `to` (e.g. 100 -> 101 is `1.0`).
pub fn pct_change(from: f64, to: f64) -> f64 {
    ratio_or(to - from, from, 0.0) * 100.0
}

/// Absolute distance between two prices as a percentage of `reference`.
pub fn pct_distance(price: f64, reference: f64) -> f64 {
    ratio_or((price - reference).abs(), reference.abs(), f64::INFINITY) * 100.0
}
