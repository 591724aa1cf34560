//! Brute-force lock-in phase correction.
//!
//! The raw signal `X + iY` is rotated by every whole degree in `[-90°, 90°]`; the
//! angle leaving the smallest quadrature RMS wins, first minimum on ties. The 1°
//! grid bounds the precision.

use serde::{Deserialize, Serialize};

use crate::error::FmrError;
use crate::math::argmin;

/// Phase grid, inclusive at both ends.
pub const PHASE_MIN_DEG: i32 = -90;
pub const PHASE_MAX_DEG: i32 = 90;

/// Chosen rotation and the corrected in-phase signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutophaseResult {
    pub phase_deg: i32,
    /// Rotated in-phase component `X′`.
    pub x: Vec<f64>,
    /// Quadrature RMS left after the rotation.
    pub y_rms: f64,
}

/// Rotate `(x, y)` by `phase_deg`: `X′ + iY′ = e^{iφ}·(X + iY)`.
pub fn rotate(x: &[f64], y: &[f64], phase_deg: f64) -> (Vec<f64>, Vec<f64>) {
    let (s, c) = phase_deg.to_radians().sin_cos();
    x.iter()
        .zip(y)
        .map(|(&xi, &yi)| (xi * c - yi * s, xi * s + yi * c))
        .unzip()
}

/// Root-mean-square of `values` (0 for an empty slice).
pub fn rms(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    (values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64).sqrt()
}

/// Find the rotation minimizing the quadrature RMS of one full sweep.
pub fn autophase(x: &[f64], y: &[f64]) -> Result<AutophaseResult, FmrError> {
    if x.len() != y.len() {
        return Err(FmrError::invalid_input(format!(
            "in-phase and quadrature lengths differ ({} vs {}).",
            x.len(),
            y.len()
        )));
    }
    if x.is_empty() {
        return Err(FmrError::invalid_input("autophase needs at least one sample."));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(FmrError::invalid_input("lock-in samples contain non-finite values."));
    }

    let grid: Vec<i32> = (PHASE_MIN_DEG..=PHASE_MAX_DEG).collect();
    let scores: Vec<f64> = grid
        .iter()
        .map(|&phi| rms(&rotate(x, y, phi as f64).1))
        .collect();
    let best = argmin(&scores).ok_or_else(|| FmrError::invalid_input("no finite phase score."))?;
    let phase_deg = grid[best];

    let (x_rot, _) = rotate(x, y, phase_deg as f64);
    log::info!("Autophase correction: {phase_deg} degree");

    Ok(AutophaseResult {
        phase_deg,
        x: x_rot,
        y_rms: scores[best],
    })
}
