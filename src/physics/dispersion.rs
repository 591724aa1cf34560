//! Kittel dispersion relations and the linear linewidth relation.
//!
//! Forward relations give the resonance frequency (Hz) at a field (T); inverse
//! relations give the expected resonance field at a frequency and are used to
//! plan sweeps. All magnetizations are in A/m.

use crate::domain::DispersionMode;
use crate::physics::constants::{gamma_prime, MU0};

/// Resonance frequency (Hz) at field `b` for magnetization `m` and g-factor `g`.
///
/// In-plane returns NaN where `B·(B + μ0·M) < 0`.
pub fn kittel_frequency(mode: DispersionMode, b: f64, m: f64, g: f64) -> f64 {
    let gp = gamma_prime(g);
    match mode {
        DispersionMode::InPlane => gp * (b * (b + MU0 * m)).sqrt(),
        DispersionMode::OutOfPlane => gp * (b - MU0 * m),
    }
}

/// Expected resonance field (T) at frequency `f` (Hz).
pub fn resonance_field(mode: DispersionMode, f: f64, m: f64, gamma_prime: f64) -> f64 {
    match mode {
        DispersionMode::InPlane => {
            let half = MU0 * m / 2.0;
            -half + (half * half + (f / gamma_prime).powi(2)).sqrt()
        }
        DispersionMode::OutOfPlane => (f / gamma_prime + MU0 * m).abs(),
    }
}

/// HWHM linewidth (T) at frequency `f` (Hz): `ΔB(f) = α·f/γ′ + ΔB0`.
pub fn linewidth(f: f64, alpha: f64, delta_b0: f64, gamma_prime: f64) -> f64 {
    alpha * f / gamma_prime + delta_b0
}
