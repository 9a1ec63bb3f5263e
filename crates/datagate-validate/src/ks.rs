//! Two-sample Kolmogorov–Smirnov test.
//!
//! The statistic is evaluated on the integer lattice `|i·n - j·m|` (with `i`,
//! `j` the number of observations of each sample at or below a value), so ties
//! and argument order never introduce rounding differences.
//!
//! P-values:
//! - **Exact**: probability that a uniformly random lattice path from `(0, 0)`
//!   to `(m, n)` touches the band `|i·n - j·m| >= D·m·n`. Used while
//!   `m·n <= EXACT_MAX_CELLS`.
//! - **Asymptotic**: Kolmogorov distribution at `λ = D·sqrt(m·n / (m + n))`.

use std::cmp::Ordering;
use std::f64::consts::PI;

use thiserror::Error;

/// Largest lattice (`m·n`) evaluated with the exact path count.
pub const EXACT_MAX_CELLS: u64 = 10_000_000;

/// How the p-value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KsMethod {
    Exact,
    Asymptotic,
}

/// Result of a two-sample KS test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsResult {
    /// Maximum distance between the two empirical CDFs.
    pub statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    pub method: KsMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KsError {
    #[error("{0} sample is empty")]
    EmptySample(&'static str),
    #[error("{0} sample contains NaN")]
    NotANumber(&'static str),
}

/// Two-sided two-sample Kolmogorov–Smirnov test.
///
/// Swapping `first` and `second` yields a bit-identical result.
pub fn ks_2samp(first: &[f64], second: &[f64]) -> Result<KsResult, KsError> {
    let first = sorted_sample(first, "first")?;
    let second = sorted_sample(second, "second")?;

    // Canonical order: larger sample first, ties broken by content.
    let (x, y) = match first
        .len()
        .cmp(&second.len())
        .then_with(|| compare_samples(&first, &second))
    {
        Ordering::Less => (second, first),
        _ => (first, second),
    };

    let (m, n) = (x.len(), y.len());
    let distance = lattice_distance(&x, &y);
    let cells = (m as u64).saturating_mul(n as u64);
    let statistic = distance as f64 / cells as f64;

    if distance == 0 {
        return Ok(KsResult {
            statistic,
            p_value: 1.0,
            method: KsMethod::Exact,
        });
    }
    if cells <= EXACT_MAX_CELLS {
        return Ok(KsResult {
            statistic,
            p_value: exact_p_value(m, n, distance),
            method: KsMethod::Exact,
        });
    }
    let effective = (m as f64 * n as f64) / (m as f64 + n as f64);
    Ok(KsResult {
        statistic,
        p_value: kolmogorov_sf(statistic * effective.sqrt()),
        method: KsMethod::Asymptotic,
    })
}

fn sorted_sample(values: &[f64], label: &'static str) -> Result<Vec<f64>, KsError> {
    if values.is_empty() {
        return Err(KsError::EmptySample(label));
    }
    if values.iter().any(|value| value.is_nan()) {
        return Err(KsError::NotANumber(label));
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(sorted)
}

fn compare_samples(left: &[f64], right: &[f64]) -> Ordering {
    left.iter()
        .zip(right)
        .map(|(a, b)| a.total_cmp(b))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// `max |i·n - j·m|` over all distinct values, for sorted samples.
fn lattice_distance(x: &[f64], y: &[f64]) -> i64 {
    let (m, n) = (x.len(), y.len());
    let (mi, ni) = (m as i64, n as i64);
    let (mut i, mut j) = (0usize, 0usize);
    let mut distance = 0i64;
    while i < m && j < n {
        let value = if x[i] <= y[j] { x[i] } else { y[j] };
        while i < m && x[i] <= value {
            i += 1;
        }
        while j < n && y[j] <= value {
            j += 1;
        }
        distance = distance.max((i as i64 * ni - j as i64 * mi).abs());
    }
    distance
}

/// Probability that a random path touches `|i·n - j·m| >= band`.
///
/// Walks the lattice row by row; `row[j]` holds the probability of reaching
/// `(i, j)` without having touched the band. Mass landing on the band is
/// moved to `escaped`, which is the p-value.
fn exact_p_value(m: usize, n: usize, band: i64) -> f64 {
    let (mi, ni) = (m as i64, n as i64);
    let mut row = vec![0.0f64; n + 1];
    let mut escaped = 0.0f64;
    for i in 0..=m {
        for j in 0..=n {
            let mass = if i == 0 && j == 0 {
                1.0
            } else {
                let mut mass = 0.0;
                if i > 0 {
                    let remaining_x = (m - i + 1) as f64;
                    let remaining = (m - i + 1 + n - j) as f64;
                    mass += row[j] * remaining_x / remaining;
                }
                if j > 0 {
                    let remaining_y = (n - j + 1) as f64;
                    let remaining = (m - i + n - j + 1) as f64;
                    mass += row[j - 1] * remaining_y / remaining;
                }
                mass
            };
            if (i as i64 * ni - j as i64 * mi).abs() >= band {
                escaped += mass;
                row[j] = 0.0;
            } else {
                row[j] = mass;
            }
        }
    }
    escaped.clamp(0.0, 1.0)
}

/// Survival function of the Kolmogorov distribution.
fn kolmogorov_sf(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    if lambda < 1.18 {
        // Q(λ) = 1 - sqrt(2π)/λ · Σ exp(-(2k-1)²π² / (8λ²))
        let factor = -PI * PI / (8.0 * lambda * lambda);
        let mut sum = 0.0;
        for k in 1..=20u32 {
            let odd = f64::from(2 * k - 1);
            let term = (factor * odd * odd).exp();
            sum += term;
            if term < 1e-17 * sum {
                break;
            }
        }
        return (1.0 - (2.0 * PI).sqrt() / lambda * sum).clamp(0.0, 1.0);
    }
    // Q(λ) = 2 Σ (-1)^(k-1) exp(-2k²λ²)
    let mut sum = 0.0;
    for k in 1..=100u32 {
        let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
        let kf = f64::from(k);
        let term = (-2.0 * kf * kf * lambda * lambda).exp();
        sum += sign * term;
        if term < 1e-17 {
            break;
        }
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn identical_samples_have_unit_p_value() {
        let sample = [1.0, 2.0, 3.0, 4.0, 5.0];
        let result = ks_2samp(&sample, &sample).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn separated_samples_match_path_counts() {
        // Two of C(6, 3) = 20 paths reach a corner.
        let result = ks_2samp(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
        assert_eq!(result.statistic, 1.0);
        assert_eq!(result.p_value, 0.1);
        assert_eq!(result.method, KsMethod::Exact);

        let result = ks_2samp(&[1.0, 2.0, 3.0, 4.0, 5.0], &[6.0, 7.0, 8.0, 9.0, 10.0]).unwrap();
        approx(result.p_value, 2.0 / 252.0);

        let result = ks_2samp(&[1.0, 2.0, 3.0, 4.0], &[5.0, 6.0]).unwrap();
        approx(result.p_value, 2.0 / 15.0);
    }

    #[test]
    fn statistic_handles_ties() {
        // ECDFs: x = [1, 1, 2, 2], y = [1, 2]; identical distributions.
        let result = ks_2samp(&[1.0, 1.0, 2.0, 2.0], &[1.0, 2.0]).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.p_value, 1.0);

        // x = [1, 2, 2, 2], y = [1, 1, 1, 2]: D at value 1 is |1/4 - 3/4| = 1/2.
        let result = ks_2samp(&[1.0, 2.0, 2.0, 2.0], &[1.0, 1.0, 1.0, 2.0]).unwrap();
        approx(result.statistic, 0.5);
    }

    #[test]
    fn argument_order_does_not_matter() {
        let a = [0.3, 1.7, 2.2, 5.1, 0.9, 3.3];
        let b = [1.1, 4.2, 0.5, 6.0];
        assert_eq!(ks_2samp(&a, &b).unwrap(), ks_2samp(&b, &a).unwrap());
    }

    #[test]
    fn rejects_empty_and_nan_samples() {
        assert_eq!(
            ks_2samp(&[], &[1.0]).unwrap_err(),
            KsError::EmptySample("first")
        );
        assert_eq!(
            ks_2samp(&[1.0], &[f64::NAN]).unwrap_err(),
            KsError::NotANumber("second")
        );
    }

    #[test]
    fn kolmogorov_tail_is_monotone() {
        approx(kolmogorov_sf(0.0), 1.0);
        let mut previous = 1.0;
        for step in 1..40 {
            let value = kolmogorov_sf(f64::from(step) * 0.1);
            assert!(value <= previous + 1e-12);
            previous = value;
        }
        // Critical value for alpha = 0.05.
        assert!((kolmogorov_sf(1.358) - 0.05).abs() < 1e-3);
        // Both series agree where they meet.
        let below = kolmogorov_sf(1.18 - 1e-9);
        let above = kolmogorov_sf(1.18);
        assert!((below - above).abs() < 1e-8);
    }

    #[test]
    fn exact_and_asymptotic_agree_for_large_samples() {
        let x: Vec<f64> = (0..400).map(|v| f64::from(v) / 400.0).collect();
        let y: Vec<f64> = (0..400).map(|v| f64::from(v) / 400.0 + 0.08).collect();
        let exact = ks_2samp(&x, &y).unwrap();
        assert_eq!(exact.method, KsMethod::Exact);
        let effective = (400.0 * 400.0) / 800.0_f64;
        let asymptotic = kolmogorov_sf(exact.statistic * effective.sqrt());
        assert!((exact.p_value - asymptotic).abs() < 0.05);
    }

    #[test]
    fn large_samples_use_the_asymptotic_tail() {
        // 3200 · 3200 cells is past EXACT_MAX_CELLS.
        let x: Vec<f64> = (0..3200).map(|v| f64::from(v) / 3200.0).collect();
        let y: Vec<f64> = (0..3200).map(|v| f64::from(v) / 3200.0 + 0.05).collect();
        let result = ks_2samp(&x, &y).unwrap();

        assert_eq!(result.method, KsMethod::Asymptotic);
        assert!((result.statistic - 0.05).abs() < 1e-3);
        // λ = 0.05 · sqrt(1600) = 2, tail ≈ 2·e^-8.
        assert!(result.p_value > 1e-4 && result.p_value < 1e-2);
        assert_eq!(ks_2samp(&y, &x).unwrap(), result);
    }
}
