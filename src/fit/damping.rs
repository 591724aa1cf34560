//! Linear linewidth-vs-frequency fit.
//!
//! `ΔB(f) = α·f/γ′ + ΔB0` is linear in `(α, ΔB0)` once γ′ is fixed from the
//! Kittel g-factor, so this is an ordinary least-squares problem on the design
//! `[f/γ′, 1]`. Frequencies are GHz at the interface, Hz inside.

use nalgebra::{DMatrix, DVector};

use crate::domain::{Curve, DampingFit, ResonanceRecord};
use crate::error::FmrError;
use crate::fit::{distinct_count, CURVE_POINTS};
use crate::math::{covariance_from_jacobian, linspace, solve_least_squares};
use crate::physics::{linewidth, GHZ};

/// Fit `(α, ΔB0)` to HWHM linewidths (T) at frequencies (GHz).
pub fn fit_damping(freqs_ghz: &[f64], linewidths: &[f64], gamma_prime: f64) -> Result<DampingFit, FmrError> {
    if freqs_ghz.len() != linewidths.len() {
        return Err(FmrError::invalid_input(format!(
            "{} linewidths for {} frequencies.",
            linewidths.len(),
            freqs_ghz.len()
        )));
    }
    if !(gamma_prime.is_finite() && gamma_prime > 0.0) {
        return Err(FmrError::invalid_input(format!(
            "gyromagnetic prefactor must be positive, got {gamma_prime}."
        )));
    }
    let distinct = distinct_count(freqs_ghz);
    if distinct < 2 {
        return Err(FmrError::InsufficientData {
            what: "damping fit",
            needed: 2,
            got: distinct,
        });
    }

    let n = freqs_ghz.len();
    let x = DMatrix::from_fn(n, 2, |i, j| match j {
        0 => freqs_ghz[i] * GHZ / gamma_prime,
        _ => 1.0,
    });
    let y = DVector::from_column_slice(linewidths);
    let beta = solve_least_squares(&x, &y)
        .ok_or_else(|| FmrError::not_converged("linewidth design matrix is singular"))?;
    let (alpha, delta_b0) = (beta[0], beta[1]);

    let sse = (&y - &x * &beta).norm_squared();
    let covariance = covariance_from_jacobian(&x, sse);

    let f_max = freqs_ghz.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let cx = linspace(0.0, f_max, CURVE_POINTS);
    let cy = cx
        .iter()
        .map(|&f| linewidth(f * GHZ, alpha, delta_b0, gamma_prime))
        .collect();

    log::info!("damping: alpha = {alpha:.5}, DeltaB0 = {delta_b0:.5} T");

    Ok(DampingFit {
        alpha,
        delta_b0,
        gamma_prime,
        covariance,
        curve: Curve { x: cx, y: cy },
    })
}

/// Fit the Lorentzian half-widths Γ of `records`.
///
/// For Voigt records σ is carried in the records and reports but not fitted.
pub fn fit_damping_records(records: &[ResonanceRecord], gamma_prime: f64) -> Result<DampingFit, FmrError> {
    let freqs: Vec<f64> = records.iter().map(|r| r.frequency_ghz).collect();
    let widths: Vec<f64> = records.iter().map(|r| r.gamma).collect();
    fit_damping(&freqs, &widths, gamma_prime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::gamma_prime;
    use rand::prelude::*;
    use rand::rngs::StdRng;
    use rand_distr::Normal;

    fn frequencies() -> Vec<f64> {
        (1..=12).map(|k| 2.5 * k as f64).collect()
    }

    #[test]
    fn recovers_alpha_and_zero_frequency_linewidth() {
        let gp = gamma_prime(2.1);
        let freqs = frequencies();
        let widths: Vec<f64> = freqs.iter().map(|&f| linewidth(f * GHZ, 0.005, 0.001, gp)).collect();
        let fit = fit_damping(&freqs, &widths, gp).unwrap();
        assert!((fit.alpha - 0.005).abs() < 1e-9, "alpha {}", fit.alpha);
        assert!((fit.delta_b0 - 0.001).abs() < 1e-9, "dB0 {}", fit.delta_b0);
        assert!(fit.alpha().error < 1e-9);
    }

    #[test]
    fn noisy_linewidths_give_finite_errors() {
        let gp = gamma_prime(2.0);
        let freqs = frequencies();
        let mut rng = StdRng::seed_from_u64(11);
        let noise = Normal::new(0.0, 2e-5).unwrap();
        let widths: Vec<f64> = freqs
            .iter()
            .map(|&f| linewidth(f * GHZ, 0.008, 0.0005, gp) + noise.sample(&mut rng))
            .collect();
        let fit = fit_damping(&freqs, &widths, gp).unwrap();
        let alpha = fit.alpha();
        assert!(alpha.error > 0.0 && alpha.error.is_finite());
        assert!((alpha.value - 0.008).abs() < 5.0 * alpha.error, "{alpha:?}");
    }

    #[test]
    fn dense_curve_runs_from_zero_to_top_frequency() {
        let gp = gamma_prime(2.1);
        let freqs = frequencies();
        let widths: Vec<f64> = freqs.iter().map(|&f| linewidth(f * GHZ, 0.005, 0.001, gp)).collect();
        let fit = fit_damping(&freqs, &widths, gp).unwrap();
        assert_eq!(fit.curve.x.len(), CURVE_POINTS);
        assert_eq!(fit.curve.x[0], 0.0);
        assert_eq!(*fit.curve.x.last().unwrap(), 30.0);
        assert!((fit.curve.y[0] - 0.001).abs() < 1e-9);
    }

    #[test]
    fn needs_two_distinct_frequencies() {
        let gp = gamma_prime(2.1);
        let err = fit_damping(&[10.0], &[0.002], gp).unwrap_err();
        assert!(matches!(err, FmrError::InsufficientData { needed: 2, got: 1, .. }));
        let err = fit_damping(&[10.0, 10.0], &[0.002, 0.003], gp).unwrap_err();
        assert!(matches!(err, FmrError::InsufficientData { .. }));
    }
}
