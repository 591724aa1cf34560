//! First-derivative resonance profiles.
//!
//! Lock-in detection with field modulation records the field derivative of the
//! absorption line. The three profiles are:
//!
//! - Lorentz: closed-form derivative of a Lorentzian.
//! - Asymmetric Lorentz: a Lorentzian with an admixed dispersive part (β),
//!   differentiated numerically.
//! - Voigt: `A·Γ²·V(B − B0; σ, Γ)`, differentiated numerically.
//!
//! The numerical derivatives use `math::gradient` (second-order central in the
//! interior, second-order one-sided at the ends) on the caller's field axis, so
//! their values near the sweep edges depend on the sampling.

use crate::domain::LineShape;
use crate::error::FmrError;
use crate::math::{gradient, linspace, voigt_profile};

/// Evaluate `shape` with parameter vector `params` on the field axis `field`.
pub fn evaluate(shape: LineShape, field: &[f64], params: &[f64]) -> Result<Vec<f64>, FmrError> {
    shape.check_len(params)?;
    let out = match shape {
        LineShape::Lorentz => {
            lorentz_derivative(field, params[0], params[1], params[2], params[3])
        }
        LineShape::AsymmetricLorentz => asymmetric_lorentz_derivative(
            field, params[0], params[1], params[2], params[3], params[4],
        ),
        LineShape::Voigt => {
            voigt_derivative(field, params[0], params[1], params[2], params[3], params[4])
        }
    };
    Ok(out)
}

/// `A·Γ²·(B0 − B) / ((B − B0)² + Γ²)² + offset`.
pub fn lorentz_derivative(field: &[f64], amplitude: f64, center: f64, gamma: f64, offset: f64) -> Vec<f64> {
    let g2 = gamma * gamma;
    field
        .iter()
        .map(|&b| {
            let d = b - center;
            let denom = d * d + g2;
            amplitude * g2 * (center - b) / (denom * denom) + offset
        })
        .collect()
}

/// Numerical derivative of `A·Γ²·(1 + 2β(B0 − B)/Γ) / ((B0 − B)² + Γ²)`, plus offset.
pub fn asymmetric_lorentz_derivative(
    field: &[f64],
    amplitude: f64,
    center: f64,
    gamma: f64,
    offset: f64,
    beta: f64,
) -> Vec<f64> {
    let g2 = gamma * gamma;
    let line: Vec<f64> = field
        .iter()
        .map(|&b| {
            let d = center - b;
            amplitude * g2 * (1.0 + 2.0 * beta * d / gamma) / (d * d + g2)
        })
        .collect();
    add_offset(gradient(&line, field), offset)
}

/// Numerical derivative of `A·Γ²·V(B − B0; σ, Γ)`, plus offset.
pub fn voigt_derivative(
    field: &[f64],
    amplitude: f64,
    center: f64,
    gamma: f64,
    sigma: f64,
    offset: f64,
) -> Vec<f64> {
    let scale = amplitude * gamma * gamma;
    let line: Vec<f64> = field
        .iter()
        .map(|&b| scale * voigt_profile(b - center, sigma, gamma))
        .collect();
    add_offset(gradient(&line, field), offset)
}

/// Evaluate on an `oversample`-times denser uniform grid spanning `field`.
///
/// Returns `(grid, values)`; used for smooth fitted lines in plots and exports.
pub fn dense_line(
    shape: LineShape,
    field: &[f64],
    params: &[f64],
    oversample: usize,
) -> Result<(Vec<f64>, Vec<f64>), FmrError> {
    let (Some(&first), Some(&last)) = (field.first(), field.last()) else {
        return Err(FmrError::invalid_input("cannot oversample an empty field axis."));
    };
    let grid = linspace(first, last, field.len() * oversample.max(1));
    let values = evaluate(shape, &grid, params)?;
    Ok((grid, values))
}

fn add_offset(mut values: Vec<f64>, offset: f64) -> Vec<f64> {
    for v in values.iter_mut() {
        *v += offset;
    }
    values
}
