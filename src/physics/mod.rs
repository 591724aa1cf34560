//! Physical constants and closed-form magnetization-dynamics relations.
//!
//! Everything that converts between field, frequency, magnetization, g-factor and
//! damping lives here so the fitters and the acquisition planner share one copy.

pub mod constants;
pub mod dispersion;

pub use constants::*;
pub use dispersion::*;
