//! Reporting: the text report and two-column `.xy` renderings.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays free of presentation concerns
//! - output changes are localized
//!
//! Nothing here writes files; callers decide where the rendered text goes.

pub mod format;

pub use format::*;

use crate::app::pipeline::{BatchOutput, DatasetOutcome};
use crate::domain::ResonanceRecord;

pub const KITTEL_HEADER: &str = "# resonance field (T), resonance frequency (GHz)";
pub const LINEWIDTH_HEADER: &str = "# resonance frequency (GHz), linewidth (T)";

/// One rendered text export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub name: String,
    pub contents: String,
}

/// Rows of `%14.10f` columns separated by one space, optionally headed.
pub fn render_columns(header: Option<&str>, columns: &[&[f64]]) -> String {
    let mut out = String::new();
    if let Some(h) = header {
        out.push_str(h);
        out.push('\n');
    }
    let rows = columns.iter().map(|c| c.len()).min().unwrap_or(0);
    for i in 0..rows {
        let line: Vec<String> = columns.iter().map(|c| format!("{:14.10}", c[i])).collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

pub fn render_xy(header: Option<&str>, x: &[f64], y: &[f64]) -> String {
    render_columns(header, &[x, y])
}

/// Measured resonances as `(field, frequency)`.
pub fn kittel_data_xy(records: &[ResonanceRecord]) -> String {
    let fields: Vec<f64> = records.iter().map(|r| r.resonance_field).collect();
    let freqs: Vec<f64> = records.iter().map(|r| r.frequency_ghz).collect();
    render_xy(Some(KITTEL_HEADER), &fields, &freqs)
}

/// Measured linewidths as `(frequency, Γ)`, with σ as a third column when present.
pub fn linewidth_data_xy(records: &[ResonanceRecord]) -> String {
    let freqs: Vec<f64> = records.iter().map(|r| r.frequency_ghz).collect();
    let gammas: Vec<f64> = records.iter().map(|r| r.gamma).collect();
    let sigmas: Option<Vec<f64>> = records.iter().map(|r| r.sigma).collect();
    match sigmas {
        Some(s) if !s.is_empty() => render_columns(Some(LINEWIDTH_HEADER), &[&freqs, &gammas, &s]),
        _ => render_xy(Some(LINEWIDTH_HEADER), &freqs, &gammas),
    }
}

/// Every export of a batch: fitted lines per frequency, Kittel and linewidth
/// data and fits, and the report.
pub fn batch_exports(output: &BatchOutput) -> Vec<Export> {
    let mut exports = Vec::new();

    for outcome in &output.outcomes {
        if let DatasetOutcome::Fitted { frequency_ghz, line, .. } = outcome {
            exports.push(Export {
                name: format!("{frequency_ghz:.2}GHz.xy"),
                contents: render_xy(None, &line.x, &line.y),
            });
        }
    }

    exports.push(Export {
        name: "KittelData.xy".into(),
        contents: kittel_data_xy(&output.records),
    });
    if let Some(k) = &output.kittel {
        exports.push(Export {
            name: "KittelFit.xy".into(),
            contents: render_xy(Some(KITTEL_HEADER), &k.curve.x, &k.curve.y),
        });
    }

    exports.push(Export {
        name: "LinewidthData.xy".into(),
        contents: linewidth_data_xy(&output.records),
    });
    if let Some(d) = &output.damping {
        exports.push(Export {
            name: "LinewidthFit.xy".into(),
            contents: render_xy(Some(LINEWIDTH_HEADER), &d.curve.x, &d.curve.y),
        });
    }

    exports.push(Export {
        name: "Report.log".into(),
        contents: output.report.clone(),
    });
    exports
}
