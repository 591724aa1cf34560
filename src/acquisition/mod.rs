//! Upstream helpers for the acquisition side.
//!
//! Neither module touches hardware: the autophase estimator works on recorded
//! in-phase/quadrature samples, and the planner only produces field setpoints.

pub mod autophase;
pub mod planner;

pub use autophase::*;
pub use planner::*;
