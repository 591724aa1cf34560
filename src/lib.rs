//! `fmr-fit` library crate.
//!
//! The binary (`fmr`) is a thin wrapper around this library so that:
//!
//! - the analysis core is testable without spawning processes
//! - acquisition front-ends can call the fitters and planner directly
//!
//! Data flow: sweeps -> `fit::estimate` -> `fit::fit_curve` -> resonance records
//! -> `fit::fit_kittel` -> `fit::fit_damping` -> `report`.

pub mod acquisition;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod math;
pub mod models;
pub mod physics;
pub mod report;
