//! Data sources.
//!
//! Only synthetic measurements live here; real sweeps arrive through the
//! library API as `Dataset` values.

pub mod synthetic;

pub use synthetic::*;
