//! Human-readable analysis report.
//!
//! Layout:
//!
//! ```text
//! Line profile: <shape>
//!
//! KITTEL ANALYSIS:
//! Magnetization : <M> +/- <err> kA/m
//! g-factor      : <g> +/- <err>
//!
//!
//! LINEWIDTH ANALYSIS:
//! alpha          : <α> +- <err>
//! DeltaB(0) HWHM : <ΔB0> +- <err> T
//! ```
//!
//! followed, for the asymmetric Lorentz shape, by a table of β per frequency.
//! Sections whose fit is missing are replaced by a one-line notice.

use crate::domain::{DampingFit, KittelFit, LineShape, ResonanceRecord};

pub fn format_report(
    shape: LineShape,
    records: &[ResonanceRecord],
    kittel: Option<&KittelFit>,
    damping: Option<&DampingFit>,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("Line profile: {}\n\n", shape.display_name()));

    out.push_str("KITTEL ANALYSIS:\n");
    match kittel {
        Some(k) => {
            let m = k.magnetization();
            let g = k.g_factor();
            out.push_str(&format!(
                "Magnetization : {:10.3} +/- {:10.3} kA/m\n",
                m.value / 1e3,
                m.error / 1e3
            ));
            out.push_str(&format!("g-factor      : {:10.3} +/- {:10.3}\n", g.value, g.error));
        }
        None => out.push_str("not available (too few resonances)\n"),
    }

    out.push_str("\n\nLINEWIDTH ANALYSIS:\n");
    match damping {
        Some(d) => {
            let alpha = d.alpha();
            let db0 = d.delta_b0();
            out.push_str(&format!("alpha          : {:8.5} +- {:8.5}\n", alpha.value, alpha.error));
            out.push_str(&format!("DeltaB(0) HWHM : {:8.5} +- {:8.5} T\n", db0.value, db0.error));
        }
        None => out.push_str("not available\n"),
    }

    if shape == LineShape::AsymmetricLorentz {
        out.push_str("\n\nASYMMETRIC LORENTZ ANALYSIS:\n");
        out.push_str(&format!("{:>12} {:>12}\n", "f (GHz)", "beta"));
        for r in records {
            if let Some(beta) = r.beta {
                out.push_str(&format!("{:12.2} {:12.6}\n", r.frequency_ghz, beta));
            }
        }
    }

    out
}
