//! Command-line parsing for the `fmr` binary.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fitting code; `app` turns these structs into library values.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Accuracy, DispersionMode, LineShape};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fmr", version, about = "Ferromagnetic resonance line-shape, Kittel and damping analysis")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a synthetic frequency series and run the full analysis on it.
    Simulate(SimulateArgs),
    /// Print the planned field sweeps for a frequency series.
    Plan(PlanArgs),
}

/// Sample estimates and the frequency series they are measured at.
#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Field geometry.
    #[arg(long, value_enum, default_value_t = DispersionMode::InPlane)]
    pub mode: DispersionMode,

    /// Sweep density preset.
    #[arg(long, value_enum, default_value_t = Accuracy::Medium)]
    pub accuracy: Accuracy,

    /// Effective magnetization estimate (kA/m).
    #[arg(long, default_value_t = 1000.0)]
    pub magnetization: f64,

    /// g-factor estimate.
    #[arg(long, default_value_t = 2.1)]
    pub g: f64,

    /// Gilbert damping estimate.
    #[arg(long, default_value_t = 0.005)]
    pub alpha: f64,

    /// Zero-frequency linewidth estimate (T).
    #[arg(long, default_value_t = 0.001)]
    pub delta_b0: f64,

    /// Lowest frequency (GHz).
    #[arg(long, default_value_t = 2.5)]
    pub freq_min: f64,

    /// Frequency step (GHz).
    #[arg(long, default_value_t = 2.5)]
    pub freq_step: f64,

    /// Highest frequency (GHz), inclusive.
    #[arg(long, default_value_t = 30.0)]
    pub freq_max: f64,

    /// Field offset added to every setpoint (T); ignored above 0.3 T.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub offset: f64,
}

/// Options for `fmr simulate`.
#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub sample: SampleArgs,

    /// Line shape used both to generate and to fit the sweeps.
    #[arg(long, value_enum, default_value_t = LineShape::Lorentz)]
    pub shape: LineShape,

    /// Noise standard deviation relative to each sweep's peak.
    #[arg(long, default_value_t = 0.01)]
    pub noise: f64,

    /// Lock-in phase applied to the raw signal (degrees).
    #[arg(long, default_value_t = 20.0, allow_hyphen_values = true)]
    pub phase: f64,

    /// Random seed for the synthetic noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Iteration budget of each nonlinear fit.
    #[arg(long, default_value_t = 200)]
    pub max_iter: usize,

    /// Print the full batch output as JSON instead of the text report.
    #[arg(long)]
    pub json: bool,

    /// Write the `.xy` exports and `Report.log` into this directory.
    #[arg(long = "export-dir", value_name = "DIR")]
    pub export_dir: Option<PathBuf>,
}

/// Options for `fmr plan`.
#[derive(Debug, Args, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub sample: SampleArgs,

    /// Print the plans as JSON, field lists included.
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulate_defaults() {
        let cli = Cli::parse_from(["fmr", "simulate"]);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.shape, LineShape::Lorentz);
        assert_eq!(args.sample.mode, DispersionMode::InPlane);
        assert_eq!(args.sample.freq_max, 30.0);
        assert!(!args.json);
    }

    #[test]
    fn plan_accepts_kebab_case_values() {
        let cli = Cli::parse_from(["fmr", "plan", "--mode", "out-of-plane", "--accuracy", "high", "--offset", "-0.001"]);
        let Command::Plan(args) = cli.command else {
            panic!("expected plan");
        };
        assert_eq!(args.sample.mode, DispersionMode::OutOfPlane);
        assert_eq!(args.sample.accuracy, Accuracy::High);
        assert_eq!(args.sample.offset, -0.001);
    }

    #[test]
    fn shape_value_names() {
        let cli = Cli::parse_from(["fmr", "simulate", "--shape", "asymmetric-lorentz"]);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.shape, LineShape::AsymmetricLorentz);
    }
}
