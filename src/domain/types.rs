//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON for downstream plotting/reporting collaborators
//! - reloaded later and re-evaluated through the same line shapes
//!
//! Units: fields in tesla, frequencies in GHz, magnetization in A/m (reported as kA/m).

use std::str::FromStr;

use clap::ValueEnum;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::FmrError;

/// Index of the amplitude in every line-shape parameter vector.
pub const AMPLITUDE: usize = 0;
/// Index of the resonance field in every line-shape parameter vector.
pub const CENTER: usize = 1;
/// Index of the Lorentzian half-width Γ in every line-shape parameter vector.
pub const GAMMA: usize = 2;

/// Resonance line-shape model.
///
/// The parameter layout is fixed per variant and is the contract between the
/// estimator, the fitter and the report:
///
/// - `Lorentz`: `[A, B0, Γ, offset]`
/// - `AsymmetricLorentz`: `[A, B0, Γ, offset, β]`
/// - `Voigt`: `[A, B0, Γ, σ, offset]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LineShape {
    Lorentz,
    AsymmetricLorentz,
    Voigt,
}

impl LineShape {
    pub const ALL: [LineShape; 3] = [
        LineShape::Lorentz,
        LineShape::AsymmetricLorentz,
        LineShape::Voigt,
    ];

    /// Human-readable label for reports.
    pub fn display_name(self) -> &'static str {
        match self {
            LineShape::Lorentz => "Lorentz",
            LineShape::AsymmetricLorentz => "Asymmetric Lorentz",
            LineShape::Voigt => "Voigt",
        }
    }

    /// Length of the parameter vector.
    pub fn param_len(self) -> usize {
        self.param_names().len()
    }

    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            LineShape::Lorentz => &["amplitude", "center", "gamma", "offset"],
            LineShape::AsymmetricLorentz => &["amplitude", "center", "gamma", "offset", "beta"],
            LineShape::Voigt => &["amplitude", "center", "gamma", "sigma", "offset"],
        }
    }

    pub fn offset_index(self) -> usize {
        match self {
            LineShape::Lorentz | LineShape::AsymmetricLorentz => 3,
            LineShape::Voigt => 4,
        }
    }

    /// Index of the Gaussian width σ (Voigt only).
    pub fn sigma_index(self) -> Option<usize> {
        match self {
            LineShape::Voigt => Some(3),
            _ => None,
        }
    }

    /// Index of the asymmetry β (asymmetric Lorentz only).
    pub fn beta_index(self) -> Option<usize> {
        match self {
            LineShape::AsymmetricLorentz => Some(4),
            _ => None,
        }
    }

    /// Fail with `ShapeMismatch` unless `params` has this variant's length.
    pub fn check_len(self, params: &[f64]) -> Result<(), FmrError> {
        if params.len() != self.param_len() {
            return Err(FmrError::ShapeMismatch {
                shape: self.display_name(),
                expected: self.param_len(),
                got: params.len(),
            });
        }
        Ok(())
    }
}

impl FromStr for LineShape {
    type Err = FmrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match key.as_str() {
            "lorentz" => Ok(LineShape::Lorentz),
            "asymmetric-lorentz" => Ok(LineShape::AsymmetricLorentz),
            "voigt" => Ok(LineShape::Voigt),
            _ => Err(FmrError::InvalidMode(s.to_string())),
        }
    }
}

/// Sample geometry selecting the Kittel dispersion branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DispersionMode {
    /// Field in the film plane: `f = γ′·√(B·(B + μ0·M))`.
    InPlane,
    /// Field along the film normal: `f = γ′·(B − μ0·M)`.
    OutOfPlane,
}

impl DispersionMode {
    pub fn display_name(self) -> &'static str {
        match self {
            DispersionMode::InPlane => "in-plane",
            DispersionMode::OutOfPlane => "out-of-plane",
        }
    }
}

impl FromStr for DispersionMode {
    type Err = FmrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in-plane" | "ip" => Ok(DispersionMode::InPlane),
            "out-of-plane" | "oop" => Ok(DispersionMode::OutOfPlane),
            _ => Err(FmrError::InvalidMode(s.to_string())),
        }
    }
}

/// Sweep density preset for the field-range planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Accuracy {
    Low,
    Medium,
    High,
}

impl Accuracy {
    /// Half-extent of the sweep in expected linewidths.
    pub fn multiplier(self) -> f64 {
        match self {
            Accuracy::Low => 12.0,
            Accuracy::Medium => 8.0,
            Accuracy::High => 6.0,
        }
    }

    /// Sample points per expected linewidth.
    pub fn sampling(self) -> f64 {
        match self {
            Accuracy::Low => 4.0,
            Accuracy::Medium => 6.0,
            Accuracy::High => 8.0,
        }
    }
}

impl FromStr for Accuracy {
    type Err = FmrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Accuracy::Low),
            "medium" => Ok(Accuracy::Medium),
            "high" => Ok(Accuracy::High),
            _ => Err(FmrError::InvalidMode(s.to_string())),
        }
    }
}

/// One frequency's raw field sweep (field in T, lock-in signal in V).
///
/// The field axis is expected to be ascending; this is assumed, not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepCurve {
    field: Vec<f64>,
    signal: Vec<f64>,
}

impl SweepCurve {
    pub fn new(field: Vec<f64>, signal: Vec<f64>) -> Result<Self, FmrError> {
        if field.len() != signal.len() {
            return Err(FmrError::invalid_input(format!(
                "field and signal lengths differ ({} vs {}).",
                field.len(),
                signal.len()
            )));
        }
        if field.is_empty() {
            return Err(FmrError::invalid_input("sweep curve is empty."));
        }
        if field.iter().chain(signal.iter()).any(|v| !v.is_finite()) {
            return Err(FmrError::invalid_input("sweep curve contains non-finite values."));
        }
        Ok(Self { field, signal })
    }

    pub fn field(&self) -> &[f64] {
        &self.field
    }

    pub fn signal(&self) -> &[f64] {
        &self.signal
    }

    pub fn len(&self) -> usize {
        self.field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }
}

/// Converged parameters and covariance of one line-shape fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub shape: LineShape,
    pub params: Vec<f64>,
    pub covariance: DMatrix<f64>,
}

impl FitResult {
    pub fn new(shape: LineShape, params: Vec<f64>, covariance: DMatrix<f64>) -> Result<Self, FmrError> {
        shape.check_len(&params)?;
        if covariance.nrows() != params.len() || covariance.ncols() != params.len() {
            return Err(FmrError::ShapeMismatch {
                shape: shape.display_name(),
                expected: params.len(),
                got: covariance.nrows().max(covariance.ncols()),
            });
        }
        Ok(Self {
            shape,
            params,
            covariance,
        })
    }

    /// Standard errors (square roots of the covariance diagonal).
    pub fn std_errors(&self) -> Vec<f64> {
        self.covariance.diagonal().iter().map(|v| v.sqrt()).collect()
    }

    pub fn center(&self) -> f64 {
        self.params[CENTER]
    }

    pub fn gamma(&self) -> f64 {
        self.params[GAMMA]
    }

    pub fn sigma(&self) -> Option<f64> {
        self.shape.sigma_index().map(|i| self.params[i])
    }

    pub fn beta(&self) -> Option<f64> {
        self.shape.beta_index().map(|i| self.params[i])
    }
}

/// Resonance extracted from one converged fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResonanceRecord {
    pub frequency_ghz: f64,
    pub resonance_field: f64,
    pub gamma: f64,
    /// Gaussian width, Voigt fits only.
    pub sigma: Option<f64>,
    /// Asymmetry, asymmetric Lorentz fits only.
    pub beta: Option<f64>,
}

impl ResonanceRecord {
    pub fn from_fit(frequency_ghz: f64, fit: &FitResult) -> Self {
        Self {
            frequency_ghz,
            resonance_field: fit.center(),
            gamma: fit.gamma(),
            sigma: fit.sigma(),
            beta: fit.beta(),
        }
    }
}

/// A value with its one-sigma uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measured {
    pub value: f64,
    pub error: f64,
}

/// Densely sampled model curve for plotting/export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Result of a Kittel fit across all resonances of one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KittelFit {
    pub mode: DispersionMode,
    /// Effective magnetization (A/m).
    pub magnetization: f64,
    pub g: f64,
    /// Covariance of `[M, g]`.
    pub covariance: DMatrix<f64>,
    /// Resonance frequency (GHz) vs field (T), 100 points from 0 to the largest field.
    pub curve: Curve,
}

impl KittelFit {
    pub fn magnetization(&self) -> Measured {
        Measured {
            value: self.magnetization,
            error: self.covariance[(0, 0)].sqrt(),
        }
    }

    pub fn g_factor(&self) -> Measured {
        Measured {
            value: self.g,
            error: self.covariance[(1, 1)].sqrt(),
        }
    }
}

/// Result of the linear linewidth-vs-frequency fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DampingFit {
    pub alpha: f64,
    /// Zero-frequency HWHM linewidth (T).
    pub delta_b0: f64,
    /// Gyromagnetic prefactor used for the fit (Hz/T).
    pub gamma_prime: f64,
    /// Covariance of `[α, ΔB0]`.
    pub covariance: DMatrix<f64>,
    /// Linewidth (T) vs frequency (GHz), 100 points from 0 to the largest frequency.
    pub curve: Curve,
}

impl DampingFit {
    pub fn alpha(&self) -> Measured {
        Measured {
            value: self.alpha,
            error: self.covariance[(0, 0)].sqrt(),
        }
    }

    pub fn delta_b0(&self) -> Measured {
        Measured {
            value: self.delta_b0,
            error: self.covariance[(1, 1)].sqrt(),
        }
    }
}

/// Ordered field sample points for one sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPlan {
    pub frequency_ghz: f64,
    /// Expected resonance field (T).
    pub resonance_field: f64,
    /// Expected HWHM linewidth (T).
    pub linewidth: f64,
    pub multiplier: f64,
    pub sampling: f64,
    /// Offset added to every sample (T).
    pub offset: f64,
    pub fields: Vec<f64>,
}

impl FieldPlan {
    pub fn step(&self) -> f64 {
        self.linewidth / self.sampling
    }
}

/// User-supplied guesses for the sample under test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleEstimates {
    /// Effective magnetization (A/m).
    pub magnetization: f64,
    pub g: f64,
    pub alpha: f64,
    /// Zero-frequency linewidth (T).
    pub delta_b0: f64,
}

impl Default for SampleEstimates {
    fn default() -> Self {
        Self {
            magnetization: 1000e3,
            g: 2.1,
            alpha: 0.005,
            delta_b0: 0.001,
        }
    }
}

/// One measured frequency as handed over by the acquisition/import side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub frequency_ghz: f64,
    pub curve: SweepCurve,
    /// Unchecked datasets are skipped without counting as failures.
    pub enabled: bool,
}

impl Dataset {
    pub fn new(frequency_ghz: f64, curve: SweepCurve) -> Self {
        Self {
            frequency_ghz,
            curve,
            enabled: true,
        }
    }
}

/// Optimizer settings for the nonlinear fits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    /// Relative SSE reduction below which an accepted step ends the fit.
    pub ftol: f64,
    /// Relative (scaled) step size below which an accepted step ends the fit.
    pub xtol: f64,
    /// Gradient/residual cosine below which the fit is converged.
    pub gtol: f64,
    /// Jacobian evaluations allowed before `FitDidNotConverge`.
    pub max_iter: usize,
    /// Initial Levenberg-Marquardt damping.
    pub lambda0: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            ftol: 1e-10,
            xtol: 1e-10,
            gtol: 1e-10,
            max_iter: 200,
            lambda0: 1e-3,
        }
    }
}
