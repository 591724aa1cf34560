//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - model selectors (`LineShape`, `DispersionMode`, `Accuracy`)
//! - measured inputs (`SweepCurve`, `Dataset`, `SampleEstimates`)
//! - fit outputs (`FitResult`, `ResonanceRecord`, `KittelFit`, `DampingFit`, `FieldPlan`)

pub mod types;

pub use types::*;
