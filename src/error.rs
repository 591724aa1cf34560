//! Error types.
//!
//! `FmrError` is the library error: every numeric operation returns it, and each
//! variant names one failure class a caller can react to (skip a dataset, abort an
//! aggregate fit, fix a wiring bug). `AppError` is the binary-level wrapper that
//! carries a process exit code.

/// Failure kinds raised by the analysis core.
#[derive(Clone, PartialEq)]
pub enum FmrError {
    /// The optimizer hit its iteration budget or the Jacobian was singular.
    ///
    /// Per-dataset: a batch records it and moves on.
    FitDidNotConverge { reason: String },
    /// Too few points for an aggregate (Kittel / damping) fit.
    InsufficientData {
        what: &'static str,
        needed: usize,
        got: usize,
    },
    /// Unknown dispersion mode, line shape or accuracy tag.
    InvalidMode(String),
    /// Parameter vector length does not match the declared line shape.
    ShapeMismatch {
        shape: &'static str,
        expected: usize,
        got: usize,
    },
    /// Empty, non-finite or out-of-range scalar/sequence input.
    InvalidInput(String),
}

impl FmrError {
    pub fn not_converged(reason: impl Into<String>) -> Self {
        Self::FitDidNotConverge {
            reason: reason.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Whether a batch may skip the offending dataset and continue.
    ///
    /// Wiring errors (unknown mode, parameter vector of the wrong length) are not.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            Self::FitDidNotConverge { .. } | Self::InsufficientData { .. } | Self::InvalidInput(_)
        )
    }
}

impl std::fmt::Display for FmrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FitDidNotConverge { reason } => write!(f, "Fit did not converge: {reason}"),
            Self::InsufficientData { what, needed, got } => write!(
                f,
                "Insufficient data for {what}: need at least {needed} points, got {got}."
            ),
            Self::InvalidMode(tag) => write!(f, "Invalid mode: '{tag}'."),
            Self::ShapeMismatch {
                shape,
                expected,
                got,
            } => write!(
                f,
                "Parameter vector for {shape} must have {expected} entries, got {got}."
            ),
            Self::InvalidInput(message) => write!(f, "Invalid input: {message}"),
        }
    }
}

impl std::fmt::Debug for FmrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FmrError({self})")
    }
}

impl std::error::Error for FmrError {}

/// Error surfaced by the `fmr` binary.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FmrError> for AppError {
    fn from(err: FmrError) -> Self {
        let exit_code = match err {
            FmrError::InvalidInput(_) | FmrError::InvalidMode(_) => 2,
            FmrError::InsufficientData { .. } => 3,
            FmrError::FitDidNotConverge { .. } => 4,
            FmrError::ShapeMismatch { .. } => 5,
        };
        Self::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
