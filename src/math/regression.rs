//! Ordinary least squares for a single regressor, plus Pearson correlation.
//!
//! ```text
//! correlation = Σ((x - x̄)/σx · (y - ȳ)/σy) / n
//! slope       = correlation · σy / σx
//! intercept   = ȳ - slope · x̄
//! ```
//!
//! The closed form is enough for one regressor; no matrix solve needed.
//! Standardizing before the cross product keeps `r` in `[-1, 1]` up to
//! rounding, whatever the scale of the inputs.

use crate::domain::RegressionResult;
use crate::error::AppError;
use crate::math::moments::{all_identical, mean, population_std};

/// Fit `y = slope · x + intercept` and compute the Pearson correlation of `(xs, ys)`.
///
/// # Errors
/// `UndefinedStatistic` when:
/// - the slices differ in length or hold fewer than 2 points
/// - any value is non-finite
/// - every `x` is equal (vertical line, slope undefined)
/// - every `y` is equal (correlation undefined)
pub fn linear_regression(xs: &[f64], ys: &[f64]) -> Result<RegressionResult, AppError> {
    if xs.len() != ys.len() {
        return Err(AppError::undefined(format!(
            "Regression inputs differ in length ({} vs {}).",
            xs.len(),
            ys.len()
        )));
    }
    let n = xs.len();
    if n < 2 {
        return Err(AppError::undefined(format!(
            "Regression needs at least 2 points, got {n}."
        )));
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return Err(AppError::undefined("Regression inputs contain non-finite values."));
    }

    if all_identical(xs) {
        return Err(AppError::undefined(
            "Regression slope is undefined: all x values are equal.",
        ));
    }
    if all_identical(ys) {
        return Err(AppError::undefined(
            "Correlation is undefined: all y values are equal.",
        ));
    }

    let (Some(mean_x), Some(mean_y)) = (mean(xs), mean(ys)) else {
        return Err(AppError::undefined("Regression needs at least 2 points, got 0."));
    };
    let std_x = population_std(xs, mean_x);
    let std_y = population_std(ys, mean_y);
    if !(std_x > 0.0 && std_x.is_finite() && std_y > 0.0 && std_y.is_finite()) {
        return Err(AppError::undefined(format!(
            "Regression is undefined: standard deviations are {std_x} (x) and {std_y} (y)."
        )));
    }

    let correlation = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| ((x - mean_x) / std_x) * ((y - mean_y) / std_y))
        .sum::<f64>()
        / n as f64;
    let slope = correlation * std_y / std_x;
    let intercept = mean_y - slope * mean_x;

    Ok(RegressionResult {
        slope,
        intercept,
        correlation,
    })
}
