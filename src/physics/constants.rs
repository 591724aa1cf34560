//! Physical constants (SI) and the gyromagnetic prefactor.
//!
//! The values are rounded to four digits; switching to CODATA values shifts
//! fitted g-factors in the fourth digit.

use std::f64::consts::PI;

/// Vacuum permeability (T·m/A).
pub const MU0: f64 = 1.2566e-6;
/// Elementary charge (C).
pub const ELEMENTARY_CHARGE: f64 = 1.602e-19;
/// Electron mass (kg).
pub const ELECTRON_MASS: f64 = 9.11e-31;

/// Nominal g-factor used where no estimate is available.
pub const NOMINAL_G: f64 = 2.1;

/// Hz per GHz.
pub const GHZ: f64 = 1e9;

/// Gyromagnetic prefactor `γ′ = g·e / (2·mₑ) / (2π)` in Hz/T.
pub fn gamma_prime(g: f64) -> f64 {
    g * ELEMENTARY_CHARGE / (2.0 * ELECTRON_MASS) / (2.0 * PI)
}
