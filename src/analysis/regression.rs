use serde::{Deserialize, Serialize};

use crate::utils::maths_utils::ratio_or;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    /// Within [0, 1]. Zero for degenerate fits.
    pub r_squared: f64,
}

impl RegressionResult {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Ordinary least squares over `(x, y)` points.
///
/// Fewer than two points, or all `x` equal, is a degenerate fit: the slope is taken from the
/// two endpoints (zero if that is undefined), the intercept passes through the mean, and
/// `r_squared` is zero. A perfect fit of constant `y` reports `r_squared = 1`.
pub fn least_squares(points: &[(f64, f64)]) -> RegressionResult {
    let n = points.len() as f64;
    if points.is_empty() {
        return RegressionResult::default();
    }

    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    // Centred sums: same normal equations, without the cancellation of n*sum(x^2) - sum(x)^2
    let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
    let sxy: f64 = points.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();

    if points.len() < 2 || sxx == 0.0 || !sxx.is_finite() {
        return endpoint_fit(points, mean_x, mean_y);
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let ss_tot: f64 = points.iter().map(|p| (p.1 - mean_y).powi(2)).sum();
    let ss_res: f64 = points
        .iter()
        .map(|p| (p.1 - (intercept + slope * p.0)).powi(2))
        .sum();

    let r_squared = if ss_tot == 0.0 {
        1.0
    } else {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };

    RegressionResult {
        slope,
        intercept,
        r_squared,
    }
}

fn endpoint_fit(points: &[(f64, f64)], mean_x: f64, mean_y: f64) -> RegressionResult {
    let slope = match (points.first(), points.last()) {
        (Some(first), Some(last)) => ratio_or(last.1 - first.1, last.0 - first.0, 0.0),
        _ => 0.0,
    };
    RegressionResult {
        slope,
        intercept: mean_y - slope * mean_x,
        r_squared: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_linear_trend() {
        // close = 100 + 2i over 50 bars
        let points: Vec<(f64, f64)> = (0..50).map(|i| (i as f64, 100.0 + 2.0 * i as f64)).collect();
        let fit = least_squares(&points);
        assert!((fit.slope - 2.0).abs() < 1e-9, "slope {}", fit.slope);
        assert!((fit.intercept - 100.0).abs() < 1e-9);
        assert!(fit.r_squared >= 0.9);
        assert!((fit.predict(60.0) - 220.0).abs() < 1e-6);
    }

    #[test]
    fn test_noisy_fit_has_partial_r_squared() {
        let points = [(0.0, 1.0), (1.0, 3.0), (2.0, 2.0), (3.0, 5.0), (4.0, 4.0)];
        let fit = least_squares(&points);
        assert!((fit.slope - 0.8).abs() < 1e-9);
        assert!((fit.intercept - 1.4).abs() < 1e-9);
        assert!((fit.r_squared - 0.64).abs() < 1e-9, "r2 {}", fit.r_squared);
    }

    #[test]
    fn test_degenerate_inputs_do_not_fail() {
        assert_eq!(least_squares(&[]), RegressionResult::default());

        let single = least_squares(&[(3.0, 7.0)]);
        assert_eq!(single.slope, 0.0);
        assert_eq!(single.intercept, 7.0);
        assert_eq!(single.r_squared, 0.0);

        let vertical = least_squares(&[(1.0, 1.0), (1.0, 5.0), (1.0, 3.0)]);
        assert_eq!(vertical.slope, 0.0, "endpoint slope is undefined");
        assert_eq!(vertical.r_squared, 0.0);
    }

    #[test]
    fn test_constant_prices_fit_perfectly() {
        let fit = least_squares(&[(0.0, 50.0), (10.0, 50.0), (20.0, 50.0)]);
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 50.0);
        assert_eq!(fit.r_squared, 1.0);
    }
}
