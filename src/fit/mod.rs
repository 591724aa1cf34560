//! Fitting orchestration.
//!
//! Responsibilities:
//!
//! - derive initial guesses and bounds from a raw sweep (`estimate`)
//! - fit one sweep with one line shape (`fitter`)
//! - fit the Kittel dispersion across resonances (`kittel`)
//! - fit the linear linewidth-vs-frequency relation (`damping`)

pub mod damping;
pub mod estimate;
pub mod fitter;
pub mod kittel;

pub use damping::*;
pub use estimate::*;
pub use fitter::*;
pub use kittel::*;

/// Number of points in the dense Kittel and damping curves.
pub const CURVE_POINTS: usize = 100;

/// Number of distinct values in `xs` (exact comparison).
fn distinct_count(xs: &[f64]) -> usize {
    let mut sorted: Vec<f64> = xs.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();
    sorted.len()
}
