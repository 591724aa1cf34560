//! Numerical building blocks: finite differences, Voigt profile, linear and
//! nonlinear least squares.

pub mod lm;
pub mod ols;
pub mod series;
pub mod voigt;

pub use lm::*;
pub use ols::*;
pub use series::*;
pub use voigt::*;
