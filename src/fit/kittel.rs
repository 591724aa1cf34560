//! Kittel dispersion fit across the resonances of one measurement mode.
//!
//! The model is fitted in GHz (frequency) against tesla (field), with parameters
//! `[M (A/m), g]`. Starting point:
//!
//! - in-plane: the generic `[1000 kA/m, 2.1]`
//! - out-of-plane: `M` from solving `f = γ′·(B − μ0·M)` at `g = 2.1` for every
//!   point and averaging, `g = 2.1`
//!
//! The fit itself is unbounded; there is typically one point per measured
//! frequency, so the covariance is only meaningful with three or more.

use crate::domain::{Curve, DispersionMode, FitOptions, KittelFit, ResonanceRecord, SampleEstimates};
use crate::error::FmrError;
use crate::fit::{distinct_count, CURVE_POINTS};
use crate::math::{levenberg_marquardt, linspace, mean, Bounds};
use crate::physics::{gamma_prime, kittel_frequency, GHZ, MU0, NOMINAL_G};

/// Fit the dispersion relation of `mode` to the accepted resonances.
pub fn fit_kittel(
    records: &[ResonanceRecord],
    mode: DispersionMode,
    opts: &FitOptions,
) -> Result<KittelFit, FmrError> {
    let fields: Vec<f64> = records.iter().map(|r| r.resonance_field).collect();
    let freqs: Vec<f64> = records.iter().map(|r| r.frequency_ghz).collect();
    fit_kittel_points(&fields, &freqs, mode, opts)
}

/// Fit from parallel slices of resonance field (T) and frequency (GHz).
pub fn fit_kittel_points(
    fields: &[f64],
    freqs_ghz: &[f64],
    mode: DispersionMode,
    opts: &FitOptions,
) -> Result<KittelFit, FmrError> {
    if fields.len() != freqs_ghz.len() {
        return Err(FmrError::invalid_input(format!(
            "{} resonance fields for {} frequencies.",
            fields.len(),
            freqs_ghz.len()
        )));
    }
    let distinct = distinct_count(freqs_ghz);
    if distinct < 2 {
        return Err(FmrError::InsufficientData {
            what: "Kittel fit",
            needed: 2,
            got: distinct,
        });
    }

    let p0 = initial_guess(fields, freqs_ghz, mode)?;
    log::debug!("Kittel {} start: M={:.1} A/m, g={:.3}", mode.display_name(), p0[0], p0[1]);

    let solution = levenberg_marquardt(
        |p: &[f64]| Ok(kittel_ghz(mode, fields, p[0], p[1])),
        freqs_ghz,
        &p0,
        &Bounds::unbounded(2),
        opts,
    )?;
    let (magnetization, g) = (solution.params[0], solution.params[1]);

    let b_max = fields.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let x = linspace(0.0, b_max, CURVE_POINTS);
    let y = kittel_ghz(mode, &x, magnetization, g);

    log::info!(
        "Kittel {}: M = {:.3} kA/m, g = {:.4}",
        mode.display_name(),
        magnetization / 1e3,
        g
    );

    Ok(KittelFit {
        mode,
        magnetization,
        g,
        covariance: solution.covariance,
        curve: Curve { x, y },
    })
}

fn kittel_ghz(mode: DispersionMode, fields: &[f64], m: f64, g: f64) -> Vec<f64> {
    fields.iter().map(|&b| kittel_frequency(mode, b, m, g) / GHZ).collect()
}

fn initial_guess(fields: &[f64], freqs_ghz: &[f64], mode: DispersionMode) -> Result<Vec<f64>, FmrError> {
    let generic = SampleEstimates::default();
    match mode {
        DispersionMode::InPlane => Ok(vec![generic.magnetization, NOMINAL_G]),
        DispersionMode::OutOfPlane => {
            let gp = gamma_prime(NOMINAL_G);
            let per_point: Vec<f64> = fields
                .iter()
                .zip(freqs_ghz)
                .map(|(&b, &f)| (b - f * GHZ / gp) / MU0)
                .collect();
            let m = mean(&per_point).ok_or_else(|| FmrError::invalid_input("no resonance points."))?;
            Ok(vec![m, NOMINAL_G])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::resonance_field;

    fn synthetic(mode: DispersionMode, m: f64, g: f64, freqs_ghz: &[f64]) -> Vec<f64> {
        freqs_ghz
            .iter()
            .map(|&f| resonance_field(mode, f * GHZ, m, gamma_prime(g)))
            .collect()
    }

    #[test]
    fn recovers_in_plane_parameters() {
        let freqs = [5.0, 10.0, 15.0, 20.0, 25.0];
        let fields = synthetic(DispersionMode::InPlane, 1000e3, 2.1, &freqs);
        let fit = fit_kittel_points(&fields, &freqs, DispersionMode::InPlane, &FitOptions::default()).unwrap();
        assert!((fit.magnetization - 1000e3).abs() / 1000e3 < 0.01, "M {}", fit.magnetization);
        assert!((fit.g - 2.1).abs() / 2.1 < 0.01, "g {}", fit.g);
    }

    #[test]
    fn recovers_in_plane_parameters_away_from_the_start() {
        let freqs = [2.5, 7.5, 12.5, 17.5, 22.5, 27.5];
        let fields = synthetic(DispersionMode::InPlane, 750e3, 2.02, &freqs);
        let fit = fit_kittel_points(&fields, &freqs, DispersionMode::InPlane, &FitOptions::default()).unwrap();
        assert!((fit.magnetization - 750e3).abs() / 750e3 < 0.01, "M {}", fit.magnetization);
        assert!((fit.g - 2.02).abs() / 2.02 < 0.01, "g {}", fit.g);
    }

    #[test]
    fn recovers_out_of_plane_parameters() {
        let freqs = [5.0, 10.0, 15.0, 20.0, 25.0];
        let fields = synthetic(DispersionMode::OutOfPlane, 800e3, 2.0, &freqs);
        let fit =
            fit_kittel_points(&fields, &freqs, DispersionMode::OutOfPlane, &FitOptions::default()).unwrap();
        assert!((fit.magnetization - 800e3).abs() / 800e3 < 0.01, "M {}", fit.magnetization);
        assert!((fit.g - 2.0).abs() / 2.0 < 0.01, "g {}", fit.g);
        assert_eq!(fit.magnetization().value, fit.magnetization);
    }

    #[test]
    fn dense_curve_spans_zero_to_largest_field() {
        let freqs = [5.0, 10.0, 20.0];
        let fields = synthetic(DispersionMode::InPlane, 1000e3, 2.1, &freqs);
        let fit = fit_kittel_points(&fields, &freqs, DispersionMode::InPlane, &FitOptions::default()).unwrap();
        assert_eq!(fit.curve.x.len(), CURVE_POINTS);
        assert_eq!(fit.curve.x[0], 0.0);
        assert_eq!(*fit.curve.x.last().unwrap(), fields[2]);
        assert!((fit.curve.y.last().unwrap() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn one_frequency_is_not_enough() {
        let err = fit_kittel_points(&[0.1, 0.1], &[10.0, 10.0], DispersionMode::InPlane, &FitOptions::default())
            .unwrap_err();
        assert!(matches!(err, FmrError::InsufficientData { needed: 2, got: 1, .. }), "{err}");
    }

    #[test]
    fn records_feed_the_point_fit() {
        let freqs = [5.0, 10.0, 15.0, 20.0];
        let fields = synthetic(DispersionMode::InPlane, 1000e3, 2.1, &freqs);
        let records: Vec<ResonanceRecord> = freqs
            .iter()
            .zip(&fields)
            .map(|(&f, &b)| ResonanceRecord {
                frequency_ghz: f,
                resonance_field: b,
                gamma: 0.001,
                sigma: None,
                beta: None,
            })
            .collect();
        let fit = fit_kittel(&records, DispersionMode::InPlane, &FitOptions::default()).unwrap();
        assert!((fit.g - 2.1).abs() < 0.021);
    }
}
