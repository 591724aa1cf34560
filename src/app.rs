//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - builds sample estimates and the measurement plan
//! - generates synthetic sweeps and runs the batch analysis
//! - prints the report (or JSON) and writes optional exports

use std::fs;

use clap::Parser;

use crate::acquisition::MeasurementPlan;
use crate::cli::{Command, PlanArgs, SampleArgs, SimulateArgs};
use crate::data::{generate_measurements, SyntheticConfig};
use crate::domain::{FitOptions, SampleEstimates};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `fmr` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Simulate(args) => handle_simulate(args),
        Command::Plan(args) => handle_plan(args),
    }
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let plan = measurement_plan(&args.sample);
    let config = SyntheticConfig {
        plan,
        shape: args.shape,
        noise: args.noise,
        phase_deg: args.phase,
        seed: args.seed,
        ..SyntheticConfig::default()
    };
    let datasets = generate_measurements(&config)?;

    let batch = pipeline::Batch {
        datasets,
        shape: args.shape,
        mode: args.sample.mode,
        options: FitOptions {
            max_iter: args.max_iter,
            ..FitOptions::default()
        },
    };
    let output = pipeline::run_batch(&batch)?;

    if args.json {
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| AppError::new(4, format!("Failed to serialize results: {e}")))?;
        println!("{json}");
    } else {
        println!("{}", output.report);
        if output.failed_count() > 0 {
            println!("\n{} of {} datasets could not be fitted.", output.failed_count(), output.outcomes.len());
        }
    }

    if let Some(dir) = &args.export_dir {
        fs::create_dir_all(dir)
            .map_err(|e| AppError::new(2, format!("Failed to create {}: {e}", dir.display())))?;
        for export in crate::report::batch_exports(&output) {
            let path = dir.join(&export.name);
            fs::write(&path, export.contents)
                .map_err(|e| AppError::new(2, format!("Failed to write {}: {e}", path.display())))?;
        }
        log::info!("exports written to {}", dir.display());
    }

    // Without a Kittel fit there is no result to report.
    if output.kittel.is_none() {
        return Err(AppError::new(3, output.aggregate_errors.join("; ")));
    }
    Ok(())
}

fn handle_plan(args: PlanArgs) -> Result<(), AppError> {
    let plan = measurement_plan(&args.sample);
    let sweeps = plan.sweeps()?;

    if args.json {
        let json = serde_json::to_string_pretty(&sweeps)
            .map_err(|e| AppError::new(4, format!("Failed to serialize plan: {e}")))?;
        println!("{json}");
        return Ok(());
    }

    println!(
        "{:>10} {:>12} {:>12} {:>8} {:>12} {:>12}",
        "f (GHz)", "B0 (T)", "dB (T)", "points", "start (T)", "stop (T)"
    );
    for s in &sweeps {
        let (start, stop) = match (s.fields.first(), s.fields.last()) {
            (Some(a), Some(b)) => (*a, *b),
            _ => (f64::NAN, f64::NAN),
        };
        println!(
            "{:10.2} {:12.5} {:12.5} {:8} {:12.5} {:12.5}",
            s.frequency_ghz,
            s.resonance_field,
            s.linewidth,
            s.fields.len(),
            start,
            stop
        );
    }
    Ok(())
}

fn measurement_plan(args: &SampleArgs) -> MeasurementPlan {
    MeasurementPlan {
        freq_min_ghz: args.freq_min,
        freq_step_ghz: args.freq_step,
        freq_max_ghz: args.freq_max,
        mode: args.mode,
        accuracy: args.accuracy,
        offset: args.offset,
        estimates: SampleEstimates {
            magnetization: args.magnetization * 1e3,
            g: args.g,
            alpha: args.alpha,
            delta_b0: args.delta_b0,
        },
    }
}
