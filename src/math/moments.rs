//! Sample moments and z-score standardization.
//!
//! All functions use the **population** convention (`/ n`, not `/ (n - 1)`).
//! Both z-scored series in the spread analysis go through the same code path,
//! so the convention is applied consistently to each side of the correlation.

use crate::error::AppError;

/// Arithmetic mean. `None` for an empty slice.
///
/// The naive `Σv / n` is corrected by a second pass, `m += Σ(v - m) / n`,
/// which removes most of the summation error on long series.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let m = values.iter().sum::<f64>() / n;
    Some(m + values.iter().map(|v| v - m).sum::<f64>() / n)
}

/// Population standard deviation about `center`: `sqrt(Σ(v - center)² / n)`.
///
/// Deviations are scaled by the largest one before squaring, so tiny or huge
/// spreads neither underflow to zero nor overflow. `NaN` for an empty slice.
pub fn population_std(values: &[f64], center: f64) -> f64 {
    let largest = values.iter().fold(0.0_f64, |acc, v| acc.max((v - center).abs()));
    if largest == 0.0 || !largest.is_finite() {
        return if values.is_empty() { f64::NAN } else { largest };
    }
    let ss: f64 = values.iter().map(|v| ((v - center) / largest).powi(2)).sum();
    largest * (ss / values.len() as f64).sqrt()
}

/// True when every value is bit-for-bit the first one (vacuously for empty).
pub(crate) fn all_identical(values: &[f64]) -> bool {
    values.iter().all(|&v| v == values[0])
}

/// Standardize `values` to z-scores: `(v - mean) / std`.
///
/// Output index `i` corresponds to input index `i`.
///
/// # Errors
/// `UndefinedStatistic` if `values` is empty, contains a non-finite value, or
/// has zero spread (every value identical).
pub fn zscore(values: &[f64]) -> Result<Vec<f64>, AppError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(AppError::undefined("Cannot z-score a series with non-finite values."));
    }
    let Some(m) = mean(values) else {
        return Err(AppError::undefined("Cannot z-score an empty series."));
    };

    let n = values.len();
    if all_identical(values) {
        return Err(AppError::undefined(format!(
            "Cannot z-score a series with zero standard deviation (all {n} values equal {}).",
            values[0]
        )));
    }

    let std = population_std(values, m);
    if !(std > 0.0 && std.is_finite()) {
        return Err(AppError::undefined(format!(
            "Cannot z-score a series whose standard deviation is {std}."
        )));
    }

    Ok(values.iter().map(|v| (v - m) / std).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rand::prelude::*;
    use rand::rngs::StdRng;
    use rand_distr::Normal;

    fn random_series(seed: u64, n: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(3.5, 1.25).unwrap();
        (0..n).map(|_| normal.sample(&mut rng)).collect()
    }

    #[test]
    fn population_std_known_value() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let m = mean(&v).unwrap();
        assert!((m - 5.0).abs() < 1e-12);
        assert!((population_std(&v, m) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn moments_of_empty_slice_are_none() {
        assert!(mean(&[]).is_none());
        assert!(population_std(&[], 0.0).is_nan());
    }

    #[test]
    fn zscore_has_zero_mean_unit_std() {
        for seed in 0..20 {
            let v = random_series(seed, 50 + seed as usize);
            let z = zscore(&v).unwrap();
            let m = mean(&z).unwrap();
            let s = population_std(&z, m);
            assert!(m.abs() < 1e-10, "seed {seed}: mean {m}");
            assert!((s - 1.0).abs() < 1e-10, "seed {seed}: std {s}");
        }
    }

    #[test]
    fn zscore_is_affine_invariant() {
        let v = random_series(7, 200);
        let z = zscore(&v).unwrap();

        for &(a, b) in &[(2.0, 0.0), (0.01, -40.0), (1000.0, 3.0e6)] {
            let scaled: Vec<f64> = v.iter().map(|x| a * x + b).collect();
            let zs = zscore(&scaled).unwrap();
            for (i, (p, q)) in z.iter().zip(&zs).enumerate() {
                assert!((p - q).abs() < 1e-8, "a={a} b={b} i={i}: {p} vs {q}");
            }
        }
    }

    #[test]
    fn zscore_preserves_order() {
        let z = zscore(&[1.0, 3.0, 2.0]).unwrap();
        assert!(z[0] < z[2] && z[2] < z[1]);
        assert!(z[2].abs() < 1e-12);
    }

    #[test]
    fn zscore_identical_values_is_undefined() {
        let err = zscore(&[0.1 + 0.2; 7]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UndefinedStatistic);

        let err = zscore(&[0.0; 3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UndefinedStatistic);
    }

    #[test]
    fn zscore_single_value_is_undefined() {
        let err = zscore(&[4.2]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UndefinedStatistic);
    }

    #[test]
    fn zscore_rejects_empty_and_non_finite() {
        assert_eq!(zscore(&[]).unwrap_err().kind(), ErrorKind::UndefinedStatistic);
        assert_eq!(
            zscore(&[1.0, f64::NAN, 2.0]).unwrap_err().kind(),
            ErrorKind::UndefinedStatistic
        );
    }

    #[test]
    fn zscore_keeps_tiny_but_real_spread() {
        let z = zscore(&[1e-20, 2e-20, 3e-20]).unwrap();
        assert!(z.iter().all(|v| v.is_finite()));
        assert!((z[0] + z[2]).abs() < 1e-9);
    }

    #[test]
    fn zscore_long_constant_series_is_undefined() {
        for (value, n) in [(0.1, 100_000), (0.3, 1_000_000), (1.1, 1_000_000)] {
            let err = zscore(&vec![value; n]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UndefinedStatistic, "{value} x {n}");
        }
    }

    #[test]
    fn zscore_resolves_small_steps_at_large_offsets() {
        let z = zscore(&[1e6, 1e6 + 1e-6, 1e6 + 2e-6]).unwrap();
        assert!(z[0] < z[1] && z[1] < z[2]);
        assert!((z[0] + z[2]).abs() < 1e-3, "{z:?}");

        let steps: Vec<f64> = (0..100).map(|i| i as f64 * 0.01).collect();
        let shifted: Vec<f64> = steps.iter().map(|v| v + 1e11).collect();
        let z = zscore(&steps).unwrap();
        let zs = zscore(&shifted).unwrap();
        for (p, q) in z.iter().zip(&zs) {
            assert!((p - q).abs() < 1e-3, "{p} vs {q}");
        }
    }

    #[test]
    fn zscore_is_invariant_to_large_offsets() {
        let v = random_series(11, 200);
        let z = zscore(&v).unwrap();

        // Tolerance tracks the rounding of `a·x + b` at this magnitude.
        for &(a, b) in &[(1.0, 1.0e9), (3.0, -2.5e8), (0.5, 4.0e7)] {
            let shifted: Vec<f64> = v.iter().map(|x| a * x + b).collect();
            let zs = zscore(&shifted).unwrap();
            for (i, (p, q)) in z.iter().zip(&zs).enumerate() {
                assert!((p - q).abs() < 1e-6, "a={a} b={b} i={i}: {p} vs {q}");
            }
        }
    }

    #[test]
    fn zscore_handles_subnormal_spread() {
        let z = zscore(&[0.0, 5e-324]).unwrap();
        assert!(z.iter().all(|v| v.is_finite()));
        assert!(z[0] < z[1]);
    }
}
