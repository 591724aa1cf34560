//! Initial guesses and bounds for a single derivative-shaped sweep.
//!
//! Heuristic (deterministic):
//!
//! 1. `offset` is the mean signal (the derivative line is close to antisymmetric).
//! 2. `width = |B(argmax) − B(argmin)| / 2 · √3`, the Lorentzian half-width that
//!    puts the derivative extrema where they are observed.
//! 3. The running trapezoidal integral of `signal − offset` approximates the
//!    absorption line. For a "down-up" sweep (minimum before maximum) its
//!    minimum marks the center, otherwise its maximum does; `scale` is the
//!    offset-corrected signal at that index.
//! 4. `scale` is corrected for each model's amplitude convention: ×10 for Voigt,
//!    ×0.01 for the Lorentz variants.
//!
//! The heuristic assumes one dominant resonance per sweep. Multi-peak sweeps and
//! strongly sloped baselines are not handled and may yield poor starting points.

use crate::domain::{LineShape, SweepCurve};
use crate::error::FmrError;
use crate::math::{argmax, argmin, cumulative_trapezoid, mean, Bounds};

/// Initial σ for the Voigt profile (T).
pub const VOIGT_SIGMA_GUESS: f64 = 0.001;

/// Starting point and box for one line-shape fit.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialGuess {
    pub params: Vec<f64>,
    pub bounds: Bounds,
}

/// Derive the initial parameter vector and bounds for `shape` from `curve`.
pub fn estimate(curve: &SweepCurve, shape: LineShape) -> Result<InitialGuess, FmrError> {
    let field = curve.field();
    let signal = curve.signal();
    if curve.len() < 2 {
        return Err(FmrError::invalid_input(format!(
            "a sweep needs at least 2 points to estimate a line, got {}.",
            curve.len()
        )));
    }

    let offset = mean(signal).ok_or_else(|| FmrError::invalid_input("empty signal."))?;
    let i_max = argmax(signal).ok_or_else(|| FmrError::invalid_input("signal has no maximum."))?;
    let i_min = argmin(signal).ok_or_else(|| FmrError::invalid_input("signal has no minimum."))?;
    let width = (field[i_max] - field[i_min]).abs() / 2.0 * 3f64.sqrt();

    let centered: Vec<f64> = signal.iter().map(|v| v - offset).collect();
    let integral = cumulative_trapezoid(&centered, field);
    let down_up = i_min < i_max;
    let idx = if down_up { argmin(&integral) } else { argmax(&integral) }
        .ok_or_else(|| FmrError::invalid_input("integral has no extremum."))?;
    let center = field[idx];
    let mut scale = signal[idx] - offset;

    match shape {
        LineShape::Voigt => scale *= 10.0,
        LineShape::Lorentz | LineShape::AsymmetricLorentz => scale *= 1e-2,
    }

    let params = match shape {
        LineShape::Lorentz => vec![scale, center, width, offset],
        LineShape::AsymmetricLorentz => vec![scale, center, width, offset, 0.0],
        LineShape::Voigt => vec![scale, center, width, VOIGT_SIGMA_GUESS, offset],
    };

    let mut bounds = Bounds::unbounded(shape.param_len());
    bounds.lower[crate::domain::CENTER] = 0.0;
    bounds.lower[crate::domain::GAMMA] = 0.0;
    if let Some(i) = shape.sigma_index() {
        bounds.lower[i] = 0.0;
    }

    log::debug!(
        "estimate {}: {} profile, params={params:?}",
        shape.display_name(),
        if down_up { "down-up" } else { "up-down" },
    );

    Ok(InitialGuess { params, bounds })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::linspace;
    use crate::models::lorentz_derivative;

    fn down_up_lorentz() -> SweepCurve {
        let field = linspace(0.03, 0.07, 401);
        // Negative amplitude: the minimum comes first along the sweep.
        let signal = lorentz_derivative(&field, -1e-5, 0.05, 0.002, 0.0);
        SweepCurve::new(field, signal).unwrap()
    }

    #[test]
    fn width_and_center_within_twenty_percent() {
        let guess = estimate(&down_up_lorentz(), LineShape::Lorentz).unwrap();
        let center = guess.params[1];
        let width = guess.params[2];
        assert!((center - 0.05).abs() / 0.05 < 0.2, "center {center}");
        assert!((width - 0.002).abs() / 0.002 < 0.2, "width {width}");
    }

    #[test]
    fn up_down_profile_uses_integral_maximum() {
        let field = linspace(0.03, 0.07, 401);
        let signal = lorentz_derivative(&field, 1e-5, 0.05, 0.002, 1e-4);
        let curve = SweepCurve::new(field, signal).unwrap();
        let guess = estimate(&curve, LineShape::Lorentz).unwrap();
        assert!((guess.params[1] - 0.05).abs() < 2e-4, "center {}", guess.params[1]);
        assert!((guess.params[3] - 1e-4).abs() < 1e-5, "offset {}", guess.params[3]);
    }

    #[test]
    fn layout_and_bounds_follow_shape() {
        let curve = down_up_lorentz();

        let g = estimate(&curve, LineShape::AsymmetricLorentz).unwrap();
        assert_eq!(g.params.len(), 5);
        assert_eq!(g.params[4], 0.0);
        assert_eq!(g.bounds.lower[4], f64::NEG_INFINITY);

        let v = estimate(&curve, LineShape::Voigt).unwrap();
        assert_eq!(v.params.len(), 5);
        assert_eq!(v.params[3], VOIGT_SIGMA_GUESS);
        assert_eq!(v.bounds.lower, vec![f64::NEG_INFINITY, 0.0, 0.0, 0.0, f64::NEG_INFINITY]);
        assert!(v.bounds.upper.iter().all(|u| u.is_infinite()));

        let l = estimate(&curve, LineShape::Lorentz).unwrap();
        // Same sweep: Voigt scale is 1000× the Lorentz scale.
        assert!((v.params[0] - 1000.0 * l.params[0]).abs() <= 1e-9 * v.params[0].abs());
    }

    #[test]
    fn single_point_is_rejected() {
        let curve = SweepCurve::new(vec![0.05], vec![1.0]).unwrap();
        assert!(matches!(
            estimate(&curve, LineShape::Lorentz),
            Err(FmrError::InvalidInput(_))
        ));
    }
}
