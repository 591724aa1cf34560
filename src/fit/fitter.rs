//! Bounded nonlinear least-squares fit of one sweep with one line shape.
//!
//! Given:
//! - a sweep (field axis, lock-in signal)
//! - a line shape
//!
//! we derive the initial guess and bounds (`estimate`), run the box-constrained
//! Levenberg-Marquardt solver on the shape's evaluation function, and return the
//! converged parameters with their covariance.

use crate::domain::{FitOptions, FitResult, LineShape, SweepCurve};
use crate::error::FmrError;
use crate::fit::estimate::estimate;
use crate::math::levenberg_marquardt;
use crate::models::evaluate;

/// Fit `curve` with `shape`.
///
/// Fails with `FitDidNotConverge` when the optimizer runs out of iterations or
/// the Jacobian is singular; a batch treats that as a skippable, per-dataset
/// failure.
pub fn fit_curve(curve: &SweepCurve, shape: LineShape, opts: &FitOptions) -> Result<FitResult, FmrError> {
    let guess = estimate(curve, shape)?;
    let field = curve.field();

    let solution = levenberg_marquardt(
        |p: &[f64]| evaluate(shape, field, p),
        curve.signal(),
        &guess.params,
        &guess.bounds,
        opts,
    )?;

    log::debug!(
        "{} fit: {} iterations, sse={:e}, params={:?}",
        shape.display_name(),
        solution.iterations,
        solution.sse,
        solution.params
    );

    FitResult::new(shape, solution.params, solution.covariance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::linspace;
    use crate::models::evaluate;
    use rand::prelude::*;
    use rand::rngs::StdRng;
    use rand_distr::Normal;

    fn synthetic(shape: LineShape, truth: &[f64]) -> SweepCurve {
        let field = linspace(0.035, 0.065, 301);
        let signal = evaluate(shape, &field, truth).unwrap();
        SweepCurve::new(field, signal).unwrap()
    }

    fn assert_recovered(fit: &FitResult, curve: &SweepCurve, truth: &[f64], rel: f64) {
        // Offsets are compared against the signal scale, not their own size.
        let peak = curve.signal().iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        for (i, (got, want)) in fit.params.iter().zip(truth.iter()).enumerate() {
            let tol = rel * want.abs() + 1e-9 * peak;
            assert!(
                (got - want).abs() <= tol,
                "{} param {i} ({}): got {got}, want {want}",
                fit.shape.display_name(),
                fit.shape.param_names()[i],
            );
        }
    }

    /// Zero residual: every standard error collapses to the rounding floor.
    fn assert_collapsed_errors(fit: &FitResult, curve: &SweepCurve, truth: &[f64]) {
        let peak = curve.signal().iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        for (i, (err, want)) in fit.std_errors().iter().zip(truth.iter()).enumerate() {
            assert!(
                *err <= 1e-6 * want.abs() + 1e-9 * peak,
                "{} param {i} ({}): std error {err}",
                fit.shape.display_name(),
                fit.shape.param_names()[i],
            );
        }
    }

    #[test]
    fn recovers_noise_free_lorentz() {
        let truth = [-1e-5, 0.05, 0.002, 2e-5];
        let curve = synthetic(LineShape::Lorentz, &truth);
        let fit = fit_curve(&curve, LineShape::Lorentz, &FitOptions::default()).unwrap();
        assert_recovered(&fit, &curve, &truth, 1e-6);
        // Zero residual: the covariance collapses.
        assert!(fit.std_errors().iter().all(|e| *e < 1e-9), "{:?}", fit.std_errors());
    }

    #[test]
    fn recovers_noise_free_asymmetric_lorentz() {
        let truth = [-1e-5, 0.05, 0.002, 2e-5, 0.1];
        let curve = synthetic(LineShape::AsymmetricLorentz, &truth);
        let fit = fit_curve(&curve, LineShape::AsymmetricLorentz, &FitOptions::default()).unwrap();
        assert_recovered(&fit, &curve, &truth, 1e-6);
        assert_eq!(fit.covariance.nrows(), 5);
        assert_collapsed_errors(&fit, &curve, &truth);
    }

    #[test]
    fn recovers_noise_free_voigt() {
        let truth = [-2.0, 0.05, 0.0015, 0.001, 2e-5];
        let curve = synthetic(LineShape::Voigt, &truth);
        let fit = fit_curve(&curve, LineShape::Voigt, &FitOptions::default()).unwrap();
        assert_recovered(&fit, &curve, &truth, 1e-6);
        assert_collapsed_errors(&fit, &curve, &truth);
    }

    #[test]
    fn noisy_lorentz_lands_near_truth_with_honest_errors() {
        let truth = [1e-5, 0.12, 0.003, 0.0];
        let field = linspace(0.09, 0.15, 361);
        let clean = evaluate(LineShape::Lorentz, &field, &truth).unwrap();
        let peak = clean.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        let mut rng = StdRng::seed_from_u64(7);
        let noise = Normal::new(0.0, 0.05 * peak).unwrap();
        let signal: Vec<f64> = clean.iter().map(|v| v + noise.sample(&mut rng)).collect();
        let curve = SweepCurve::new(field, signal).unwrap();

        let fit = fit_curve(&curve, LineShape::Lorentz, &FitOptions::default()).unwrap();
        let err = fit.std_errors();
        assert!((fit.center() - 0.12).abs() < 5.0 * err[1], "center {} ± {}", fit.center(), err[1]);
        assert!((fit.gamma() - 0.003).abs() < 5.0 * err[2], "gamma {} ± {}", fit.gamma(), err[2]);
        assert!(err[1] > 0.0 && err[2] > 0.0);
    }

    #[test]
    fn flat_sweep_is_a_skippable_failure() {
        let field = linspace(0.0, 0.1, 50);
        let curve = SweepCurve::new(field, vec![0.5; 50]).unwrap();
        let err = fit_curve(&curve, LineShape::Lorentz, &FitOptions::default()).unwrap_err();
        assert!(err.is_skippable(), "{err}");
    }

    #[test]
    fn refit_result_round_trips_through_json() {
        let truth = [-1e-5, 0.05, 0.002, 2e-5, -0.05];
        let curve = synthetic(LineShape::AsymmetricLorentz, &truth);
        let fit = fit_curve(&curve, LineShape::AsymmetricLorentz, &FitOptions::default()).unwrap();

        let json = serde_json::to_string(&fit).unwrap();
        let back: FitResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.shape, fit.shape);
        // Bitwise: every parameter and covariance entry survives the text form.
        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<u64>>();
        assert_eq!(bits(&back.params), bits(&fit.params));
        assert_eq!(back.covariance.shape(), fit.covariance.shape());
        assert_eq!(bits(back.covariance.as_slice()), bits(fit.covariance.as_slice()));

        let a = evaluate(fit.shape, curve.field(), &fit.params).unwrap();
        let b = evaluate(back.shape, curve.field(), &back.params).unwrap();
        assert_eq!(a, b);
    }
}
