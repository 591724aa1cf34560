//! Linear least squares and parameter covariance.
//!
//! Two small problems show up repeatedly:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! for the damping fit, and turning a Jacobian at the optimum into a parameter
//! covariance for every fit.
//!
//! Implementation choices:
//! - SVD throughout, so tall and rank-deficient systems are handled without
//!   panics. (Nalgebra's `QR::solve` is intended for square systems.)
//! - The covariance follows the usual nonlinear-regression convention:
//!   `pinv(JᵀJ)·SSE/(n − p)`, with singular values below
//!   `ε·max(n, p)·s_max` discarded. With no spare degrees of freedom every
//!   entry is `+∞`.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Parameter covariance from the Jacobian (`n × p`) at the optimum.
pub fn covariance_from_jacobian(jac: &DMatrix<f64>, sse: f64) -> DMatrix<f64> {
    let (n, p) = jac.shape();
    if n <= p {
        return DMatrix::from_element(p, p, f64::INFINITY);
    }

    let svd = jac.clone().svd(false, true);
    let Some(v_t) = svd.v_t else {
        return DMatrix::from_element(p, p, f64::INFINITY);
    };
    let s_max = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let threshold = f64::EPSILON * n.max(p) as f64 * s_max;

    // pinv(JᵀJ) = V·diag(1/s²)·Vᵀ over the retained singular values.
    let mut cov = DMatrix::<f64>::zeros(p, p);
    for (k, &s) in svd.singular_values.iter().enumerate() {
        if s <= threshold {
            continue;
        }
        let row = v_t.row(k);
        let inv = 1.0 / (s * s);
        for i in 0..p {
            for j in 0..p {
                cov[(i, j)] += row[i] * row[j] * inv;
            }
        }
    }

    cov * (sse / (n - p) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn covariance_matches_textbook_slope_variance() {
        // For y = a + b·x, Var(b) = s² / Σ(x - x̄)².
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let mut data = Vec::new();
        for &x in &xs {
            data.push(1.0);
            data.push(x);
        }
        let jac = DMatrix::from_row_slice(5, 2, &data);
        let sse = 3.0;
        let cov = covariance_from_jacobian(&jac, sse);
        let s2 = sse / 3.0;
        let sxx = 10.0;
        assert!((cov[(1, 1)] - s2 / sxx).abs() < 1e-12, "{}", cov[(1, 1)]);
        assert!((cov[(0, 1)] - cov[(1, 0)]).abs() < 1e-15);
    }

    #[test]
    fn covariance_is_infinite_without_spare_points() {
        let jac = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 1.0, 1.0]);
        let cov = covariance_from_jacobian(&jac, 0.0);
        assert!(cov.iter().all(|v| v.is_infinite()));
    }
}
