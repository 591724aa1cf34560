//! Batch analysis shared by the binary and library callers.
//!
//! One `Batch` value carries everything a run needs:
//! datasets -> per-dataset line-shape fits (parallel) -> resonance records ->
//! Kittel fit -> damping fit -> report.
//!
//! A dataset whose fit fails is recorded and skipped; the aggregate fits run on
//! whatever converged. An aggregate fit that cannot run (too few resonances) is
//! recorded too, and the remaining outputs are still produced.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Curve, DampingFit, Dataset, DispersionMode, FitOptions, FitResult, KittelFit, LineShape, ResonanceRecord,
};
use crate::error::FmrError;
use crate::fit::{fit_curve, fit_damping_records, fit_kittel};
use crate::models::dense_line;
use crate::physics::gamma_prime;

/// Oversampling of the fitted line relative to the measured sweep.
pub const DENSE_OVERSAMPLE: usize = 4;

/// Inputs of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub datasets: Vec<Dataset>,
    pub shape: LineShape,
    pub mode: DispersionMode,
    pub options: FitOptions,
}

impl Batch {
    pub fn new(datasets: Vec<Dataset>, shape: LineShape, mode: DispersionMode) -> Self {
        Self {
            datasets,
            shape,
            mode,
            options: FitOptions::default(),
        }
    }
}

/// What happened to one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum DatasetOutcome {
    Fitted {
        frequency_ghz: f64,
        fit: FitResult,
        record: ResonanceRecord,
        /// Fitted model on a 4× denser field grid.
        line: Curve,
    },
    Failed {
        frequency_ghz: f64,
        error: String,
    },
    /// Dataset was disabled by the caller.
    Skipped { frequency_ghz: f64 },
}

impl DatasetOutcome {
    pub fn frequency_ghz(&self) -> f64 {
        match self {
            Self::Fitted { frequency_ghz, .. }
            | Self::Failed { frequency_ghz, .. }
            | Self::Skipped { frequency_ghz } => *frequency_ghz,
        }
    }

    pub fn record(&self) -> Option<&ResonanceRecord> {
        match self {
            Self::Fitted { record, .. } => Some(record),
            _ => None,
        }
    }
}

/// All computed outputs of one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutput {
    pub shape: LineShape,
    pub mode: DispersionMode,
    /// One entry per input dataset, in input order.
    pub outcomes: Vec<DatasetOutcome>,
    /// Records of the converged fits, in input order.
    pub records: Vec<ResonanceRecord>,
    pub kittel: Option<KittelFit>,
    pub damping: Option<DampingFit>,
    /// Aggregate fits that could not run.
    pub aggregate_errors: Vec<String>,
    pub report: String,
}

impl BatchOutput {
    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DatasetOutcome::Failed { .. }))
            .count()
    }
}

/// Run the full analysis.
///
/// Only wiring errors (`InvalidMode`, `ShapeMismatch`) abort the batch.
pub fn run_batch(batch: &Batch) -> Result<BatchOutput, FmrError> {
    let outcomes = batch
        .datasets
        .par_iter()
        .map(|dataset| fit_dataset(dataset, batch.shape, &batch.options))
        .collect::<Result<Vec<_>, FmrError>>()?;

    let records: Vec<ResonanceRecord> = outcomes.iter().filter_map(|o| o.record().copied()).collect();
    log::info!(
        "{} of {} datasets fitted with {}",
        records.len(),
        outcomes.len(),
        batch.shape.display_name()
    );

    let mut aggregate_errors = Vec::new();
    let kittel = match fit_kittel(&records, batch.mode, &batch.options) {
        Ok(fit) => Some(fit),
        Err(err) if err.is_skippable() => {
            log::warn!("Kittel fit skipped: {err}");
            aggregate_errors.push(format!("Kittel fit: {err}"));
            None
        }
        Err(err) => return Err(err),
    };

    // γ′ comes from the fitted g-factor, so damping waits for the Kittel fit.
    let damping = match &kittel {
        Some(k) => match fit_damping_records(&records, gamma_prime(k.g)) {
            Ok(fit) => Some(fit),
            Err(err) if err.is_skippable() => {
                log::warn!("damping fit skipped: {err}");
                aggregate_errors.push(format!("damping fit: {err}"));
                None
            }
            Err(err) => return Err(err),
        },
        None => None,
    };

    let report = crate::report::format_report(batch.shape, &records, kittel.as_ref(), damping.as_ref());

    Ok(BatchOutput {
        shape: batch.shape,
        mode: batch.mode,
        outcomes,
        records,
        kittel,
        damping,
        aggregate_errors,
        report,
    })
}

fn fit_dataset(dataset: &Dataset, shape: LineShape, opts: &FitOptions) -> Result<DatasetOutcome, FmrError> {
    let frequency_ghz = dataset.frequency_ghz;
    if !dataset.enabled {
        return Ok(DatasetOutcome::Skipped { frequency_ghz });
    }

    let fitted = fit_curve(&dataset.curve, shape, opts).and_then(|fit| {
        let (x, y) = dense_line(shape, dataset.curve.field(), &fit.params, DENSE_OVERSAMPLE)?;
        Ok((fit, Curve { x, y }))
    });

    match fitted {
        Ok((fit, line)) => {
            let record = ResonanceRecord::from_fit(frequency_ghz, &fit);
            log::debug!(
                "{frequency_ghz} GHz: B0 = {:.5} T, gamma = {:.5} T",
                record.resonance_field,
                record.gamma
            );
            Ok(DatasetOutcome::Fitted {
                frequency_ghz,
                fit,
                record,
                line,
            })
        }
        Err(err) if err.is_skippable() => {
            log::warn!("{frequency_ghz} GHz skipped: {err}");
            Ok(DatasetOutcome::Failed {
                frequency_ghz,
                error: err.to_string(),
            })
        }
        Err(err) => Err(err),
    }
}
