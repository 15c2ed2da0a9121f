//! Statistical utility functions shared by calculators and the ranking composer.
//!
//! Every helper here treats a missing or zero denominator as "undefined" and
//! returns `None` instead of producing NaN or infinity.

use ndarray::Array1;

/// Cross-sectional z-score result containing computed statistics.
#[derive(Debug, Clone, Copy)]
pub struct StandardizeResult {
    /// The computed mean of the input values.
    pub mean: f64,
    /// The computed population standard deviation (N denominator).
    pub std: f64,
    /// False when every value was identical and a unit divisor was used.
    pub applied: bool,
}

/// Standardize an ndarray Array1 to population z-scores.
///
/// Uses population standard deviation (ddof = 0). When the standard deviation
/// is zero the divisor falls back to 1.0, so a cross-section of identical
/// values standardizes to all zeros. Any genuine spread is standardized,
/// however small its scale.
///
/// # Examples
///
/// ```
/// use ronda_traits::stats::standardize_population;
/// use ndarray::Array1;
///
/// let values = Array1::from_vec(vec![10.0, 20.0]);
/// let (z, result) = standardize_population(&values);
///
/// assert!(result.applied);
/// assert!((result.std - 5.0).abs() < 1e-12);
/// assert!((z[1] - 1.0).abs() < 1e-12);
/// ```
pub fn standardize_population(values: &Array1<f64>) -> (Array1<f64>, StandardizeResult) {
    let Some(mean) = values.mean() else {
        return (
            Array1::zeros(0),
            StandardizeResult {
                mean: f64::NAN,
                std: f64::NAN,
                applied: false,
            },
        );
    };

    // Identical inputs can still leave rounding residue in `std`
    let first = values[0];
    let std = values.std(0.0);
    let applied = std > 0.0 && values.iter().any(|&v| v != first);
    let divisor = if applied { std } else { 1.0 };
    let z = values.mapv(|v| (v - mean) / divisor);

    (z, StandardizeResult { mean, std, applied })
}

/// Divide, returning `None` for a zero or non-finite result.
#[must_use]
pub fn safe_div(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let out = numerator / denominator;
    out.is_finite().then_some(out)
}

/// `current / previous - 1`, undefined on a zero or missing denominator.
#[must_use]
pub fn pct_change(current: f64, previous: f64) -> Option<f64> {
    safe_div(current, previous).map(|r| r - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_standardize_population_basic() {
        let values = Array1::from_vec(vec![10.0, 20.0]);
        let (z, result) = standardize_population(&values);

        assert!(result.applied);
        assert_relative_eq!(result.mean, 15.0);
        assert_relative_eq!(result.std, 5.0);
        assert_relative_eq!(z[0], -1.0);
        assert_relative_eq!(z[1], 1.0);
    }

    #[test]
    fn test_standardize_population_constant_values() {
        let values = Array1::from_vec(vec![5.0, 5.0, 5.0, 5.0]);
        let (z, result) = standardize_population(&values);

        assert!(!result.applied);
        assert!(z.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_standardize_population_single_value() {
        let values = Array1::from_vec(vec![42.0]);
        let (z, result) = standardize_population(&values);

        assert!(!result.applied);
        assert_eq!(z.len(), 1);
        assert_eq!(z[0], 0.0);
    }

    #[test]
    fn test_standardize_population_empty() {
        let values = Array1::<f64>::zeros(0);
        let (z, result) = standardize_population(&values);

        assert!(z.is_empty());
        assert!(!result.applied);
        assert!(result.mean.is_nan());
    }

    #[test]
    fn test_standardize_population_small_scale_spread() {
        let values = Array1::from_vec(vec![1e-11, 3e-11]);
        let (z, result) = standardize_population(&values);

        assert!(result.applied);
        assert_relative_eq!(z[0], -1.0, max_relative = 1e-9);
        assert_relative_eq!(z[1], 1.0, max_relative = 1e-9);
    }

    #[test]
    fn test_standardize_population_identical_values() {
        let values = Array1::from_vec(vec![0.1 + 0.2; 7]);
        let (z, result) = standardize_population(&values);

        assert!(!result.applied);
        assert!(z.iter().all(|x| x.abs() < 1e-12));
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(1.0, 0.0), None);
        assert_eq!(safe_div(6.0, 3.0), Some(2.0));
        assert_eq!(safe_div(f64::INFINITY, 1.0), None);
    }

    #[test]
    fn test_pct_change() {
        assert_relative_eq!(pct_change(110.0, 100.0).unwrap(), 0.1, epsilon = 1e-12);
        assert_eq!(pct_change(1.0, 0.0), None);
    }
}
