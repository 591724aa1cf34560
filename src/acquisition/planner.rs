//! Adaptive field-range planning.
//!
//! A sweep covers `B0 ± multiplier·ΔB` in steps of `ΔB / sampling`, where `B0`
//! and `ΔB` are predicted from the sample estimates through the inverse Kittel
//! relation and the linewidth relation. Sweeps never start below zero field.

use serde::{Deserialize, Serialize};

use crate::domain::{Accuracy, DispersionMode, FieldPlan, SampleEstimates};
use crate::error::FmrError;
use crate::math::inclusive_range;
use crate::physics::{gamma_prime, linewidth, resonance_field, GHZ};

/// Above this expected resonance field (T) the field offset is not applied.
pub const OFFSET_FIELD_LIMIT: f64 = 0.3;

/// Ascending field samples from `max(0, b0 − m·ΔB)` to `b0 + m·ΔB`, shifted by `offset`.
///
/// The zero clip applies before the offset is added.
pub fn calc_b_range(
    b0: f64,
    delta_b: f64,
    multiplier: f64,
    sampling: f64,
    offset: f64,
) -> Result<Vec<f64>, FmrError> {
    if ![b0, delta_b, multiplier, sampling, offset].iter().all(|v| v.is_finite()) {
        return Err(FmrError::invalid_input("field-range inputs must be finite."));
    }
    if delta_b <= 0.0 || sampling <= 0.0 {
        return Err(FmrError::invalid_input(format!(
            "linewidth and sampling must be positive (got {delta_b}, {sampling})."
        )));
    }
    if multiplier < 0.0 {
        return Err(FmrError::invalid_input(format!("negative multiplier {multiplier}.")));
    }

    let start = (b0 - multiplier * delta_b).max(0.0);
    let stop = b0 + multiplier * delta_b;
    if stop < start {
        return Err(FmrError::invalid_input(format!(
            "sweep ends below zero field (stop {stop} T)."
        )));
    }

    let step = delta_b / sampling;
    Ok(inclusive_range(start, stop, step)
        .into_iter()
        .map(|b| b + offset)
        .collect())
}

/// Plan the sweep for one frequency from the sample estimates.
pub fn plan_sweep(
    frequency_ghz: f64,
    estimates: &SampleEstimates,
    mode: DispersionMode,
    accuracy: Accuracy,
    offset: f64,
) -> Result<FieldPlan, FmrError> {
    if !(frequency_ghz.is_finite() && frequency_ghz > 0.0) {
        return Err(FmrError::invalid_input(format!("frequency must be positive, got {frequency_ghz} GHz.")));
    }
    let gp = gamma_prime(estimates.g);
    let f = frequency_ghz * GHZ;
    let b0 = resonance_field(mode, f, estimates.magnetization, gp);
    let delta_b = linewidth(f, estimates.alpha, estimates.delta_b0, gp);

    let mut offset = offset;
    if b0 > OFFSET_FIELD_LIMIT && offset != 0.0 {
        log::warn!("expected resonance at {b0:.4} T is above {OFFSET_FIELD_LIMIT} T; field offset disabled");
        offset = 0.0;
    }
    log::info!("{frequency_ghz} GHz: expected resonance field {b0:.5} T, linewidth {delta_b:.5} T");

    let fields = calc_b_range(b0, delta_b, accuracy.multiplier(), accuracy.sampling(), offset)?;
    Ok(FieldPlan {
        frequency_ghz,
        resonance_field: b0,
        linewidth: delta_b,
        multiplier: accuracy.multiplier(),
        sampling: accuracy.sampling(),
        offset,
        fields,
    })
}

/// A full frequency series with the settings shared by all its sweeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPlan {
    pub freq_min_ghz: f64,
    pub freq_step_ghz: f64,
    pub freq_max_ghz: f64,
    pub mode: DispersionMode,
    pub accuracy: Accuracy,
    /// Field offset (T), dropped for high-field sweeps.
    pub offset: f64,
    pub estimates: SampleEstimates,
}

impl Default for MeasurementPlan {
    fn default() -> Self {
        Self {
            freq_min_ghz: 2.5,
            freq_step_ghz: 2.5,
            freq_max_ghz: 30.0,
            mode: DispersionMode::InPlane,
            accuracy: Accuracy::Medium,
            offset: 0.0,
            estimates: SampleEstimates::default(),
        }
    }
}

impl MeasurementPlan {
    /// Frequencies (GHz) from min to max inclusive.
    pub fn frequencies(&self) -> Result<Vec<f64>, FmrError> {
        frequency_list(self.freq_min_ghz, self.freq_step_ghz, self.freq_max_ghz)
    }

    /// One field plan per frequency, in frequency order.
    pub fn sweeps(&self) -> Result<Vec<FieldPlan>, FmrError> {
        self.frequencies()?
            .into_iter()
            .map(|f| plan_sweep(f, &self.estimates, self.mode, self.accuracy, self.offset))
            .collect()
    }
}

/// `min, min + step, …, max` (GHz).
pub fn frequency_list(min_ghz: f64, step_ghz: f64, max_ghz: f64) -> Result<Vec<f64>, FmrError> {
    if !(min_ghz.is_finite() && step_ghz.is_finite() && max_ghz.is_finite()) {
        return Err(FmrError::invalid_input("frequency range must be finite."));
    }
    if min_ghz <= 0.0 || step_ghz <= 0.0 || max_ghz < min_ghz {
        return Err(FmrError::invalid_input(format!(
            "invalid frequency range {min_ghz}..={max_ghz} step {step_ghz} GHz."
        )));
    }
    Ok(inclusive_range(min_ghz, max_ghz, step_ghz))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_around_resonance() {
        let b = calc_b_range(0.05, 0.002, 8.0, 6.0, 0.0).unwrap();
        assert!((b[0] - 0.034).abs() < 1e-12, "start {}", b[0]);
        assert!((b.last().unwrap() - 0.066).abs() < 1e-12, "stop {}", b.last().unwrap());
        assert_eq!(b.len(), 97);
        for w in b.windows(2) {
            assert!(w[1] > w[0]);
            assert!((w[1] - w[0] - 0.002 / 6.0).abs() < 1e-12);
        }
    }

    #[test]
    fn lower_bound_is_clipped_to_zero() {
        let b = calc_b_range(0.001, 0.002, 8.0, 6.0, 0.0).unwrap();
        assert_eq!(b[0], 0.0);
        assert!((b.last().unwrap() - 0.017).abs() < 1e-12);
        assert_eq!(b.len(), 52);
    }

    #[test]
    fn offset_shifts_every_point() {
        let plain = calc_b_range(0.05, 0.002, 6.0, 8.0, 0.0).unwrap();
        let shifted = calc_b_range(0.05, 0.002, 6.0, 8.0, 0.001).unwrap();
        assert_eq!(plain.len(), shifted.len());
        for (a, b) in plain.iter().zip(&shifted) {
            assert!((b - a - 0.001).abs() < 1e-15);
        }
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert!(calc_b_range(0.05, 0.0, 8.0, 6.0, 0.0).is_err());
        assert!(calc_b_range(0.05, 0.002, 8.0, 0.0, 0.0).is_err());
        assert!(calc_b_range(-1.0, 0.002, 8.0, 6.0, 0.0).is_err());
        assert!(calc_b_range(f64::NAN, 0.002, 8.0, 6.0, 0.0).is_err());
    }

    #[test]
    fn sweep_is_centred_on_predicted_resonance() {
        let est = SampleEstimates::default();
        let plan = plan_sweep(10.0, &est, DispersionMode::InPlane, Accuracy::High, 0.0).unwrap();
        let gp = gamma_prime(est.g);
        let b0 = resonance_field(DispersionMode::InPlane, 10.0 * GHZ, est.magnetization, gp);
        assert_eq!(plan.resonance_field, b0);
        assert!(plan.fields[0] < b0 && *plan.fields.last().unwrap() > b0);
        assert!((plan.step() - plan.linewidth / 8.0).abs() < 1e-18);
    }

    #[test]
    fn offset_is_dropped_at_high_field() {
        let est = SampleEstimates::default();
        let low = plan_sweep(5.0, &est, DispersionMode::InPlane, Accuracy::Low, 0.002).unwrap();
        assert_eq!(low.offset, 0.002);
        // Out-of-plane resonances sit above μ0·M ≈ 1.26 T.
        let high = plan_sweep(5.0, &est, DispersionMode::OutOfPlane, Accuracy::Low, 0.002).unwrap();
        assert!(high.resonance_field > OFFSET_FIELD_LIMIT);
        assert_eq!(high.offset, 0.0);
    }

    #[test]
    fn default_frequency_series() {
        let f = MeasurementPlan::default().frequencies().unwrap();
        assert_eq!(f.len(), 12);
        assert_eq!(f[0], 2.5);
        assert!((f[11] - 30.0).abs() < 1e-12);
        assert!(frequency_list(10.0, 1.0, 5.0).is_err());
    }

    #[test]
    fn every_sweep_gets_a_plan() {
        let plan = MeasurementPlan {
            freq_min_ghz: 5.0,
            freq_step_ghz: 5.0,
            freq_max_ghz: 20.0,
            ..MeasurementPlan::default()
        };
        let sweeps = plan.sweeps().unwrap();
        assert_eq!(sweeps.len(), 4);
        assert!(sweeps.windows(2).all(|w| w[1].resonance_field > w[0].resonance_field));
    }
}
