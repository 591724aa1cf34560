//! Box-constrained Levenberg-Marquardt.
//!
//! Minimizes `Σ (y_i − f_i(p))²` for a model given as a closure returning the
//! full prediction vector. Details:
//!
//! - forward-difference Jacobian with step `√ε·max(1, |p_j|)`, flipped to a
//!   backward difference when the forward point would leave the box
//! - Marquardt scaling: the normal equations are solved in the coordinates
//!   `p̃_j = d_j·p_j`, `d_j` being the running maximum of the Jacobian column
//!   norms, so the damping is invariant to parameter units (amplitudes of 1e-6
//!   next to fields of 0.05 T next to magnetizations of 1e6 A/m)
//! - bounds are enforced by projecting every trial point onto the box; a
//!   minimum pinned at a bound shows up as damping growing without an
//!   improving step, which is accepted as convergence
//!
//! A Jacobian that vanishes entirely at the initial guess, or has an all-zero
//! column at the solution, is reported as `FitDidNotConverge`: the parameters
//! are not identifiable and a covariance would be meaningless.

use nalgebra::{DMatrix, DVector};

use crate::domain::FitOptions;
use crate::error::FmrError;
use crate::math::ols::covariance_from_jacobian;

const LAMBDA_MIN: f64 = 1e-15;
const LAMBDA_MAX: f64 = 1e16;

/// Per-parameter box; infinite entries leave a side open.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl Bounds {
    pub fn unbounded(n: usize) -> Self {
        Self {
            lower: vec![f64::NEG_INFINITY; n],
            upper: vec![f64::INFINITY; n],
        }
    }

    pub fn len(&self) -> usize {
        self.lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    pub fn clamp(&self, params: &mut [f64]) {
        for (j, p) in params.iter_mut().enumerate() {
            *p = p.clamp(self.lower[j], self.upper[j]);
        }
    }
}

/// Converged least-squares solution.
#[derive(Debug, Clone)]
pub struct LmSolution {
    pub params: Vec<f64>,
    pub covariance: DMatrix<f64>,
    pub sse: f64,
    pub iterations: usize,
}

/// Fit `model` to `y` starting from `p0` inside `bounds`.
pub fn levenberg_marquardt<F>(
    model: F,
    y: &[f64],
    p0: &[f64],
    bounds: &Bounds,
    opts: &FitOptions,
) -> Result<LmSolution, FmrError>
where
    F: Fn(&[f64]) -> Result<Vec<f64>, FmrError>,
{
    let n = y.len();
    let p = p0.len();
    if bounds.len() != p || bounds.upper.len() != p {
        return Err(FmrError::invalid_input(format!(
            "bounds cover {} parameters, guess has {p}.",
            bounds.len()
        )));
    }
    if bounds.lower.iter().zip(&bounds.upper).any(|(lo, hi)| lo > hi) {
        return Err(FmrError::invalid_input("lower bound above upper bound."));
    }
    if n < p {
        return Err(FmrError::InsufficientData {
            what: "least-squares fit",
            needed: p,
            got: n,
        });
    }

    let y = DVector::from_column_slice(y);
    let mut params = p0.to_vec();
    bounds.clamp(&mut params);

    let mut pred = eval(&model, &params, n)?;
    let mut resid = &y - &pred;
    let mut sse = resid.norm_squared();
    if !sse.is_finite() {
        return Err(FmrError::not_converged("model is not finite at the initial guess"));
    }

    let mut lambda = opts.lambda0;
    let mut scale = vec![0.0_f64; p];

    for iter in 0..opts.max_iter {
        let jac = jacobian(&model, &params, &pred, bounds)?;
        let jtj = jac.transpose() * &jac;
        let jtr = jac.transpose() * &resid;

        for j in 0..p {
            scale[j] = scale[j].max(jtj[(j, j)].sqrt());
        }
        if iter == 0 && scale.iter().all(|&d| d == 0.0) {
            return Err(FmrError::not_converged("Jacobian vanishes at the initial guess"));
        }
        // Columns that are still zero get unit scale until they pick up a slope.
        for d in scale.iter_mut() {
            if !(*d > 0.0 && d.is_finite()) {
                *d = 1.0;
            }
        }

        if sse == 0.0 {
            return finish(&model, params, sse, iter, bounds, n);
        }
        let gnorm = (0..p)
            .map(|j| jtr[j].abs() / (scale[j] * sse.sqrt()))
            .fold(0.0_f64, f64::max);
        if gnorm <= opts.gtol {
            log::debug!("lm: gradient converged after {iter} iterations (sse={sse:e})");
            return finish(&model, params, sse, iter, bounds, n);
        }

        // Inner loop: raise damping until a trial step lowers the SSE.
        loop {
            let mut a = DMatrix::<f64>::zeros(p, p);
            let mut b = DVector::<f64>::zeros(p);
            for i in 0..p {
                b[i] = jtr[i] / scale[i];
                for j in 0..p {
                    a[(i, j)] = jtj[(i, j)] / (scale[i] * scale[j]);
                }
                a[(i, i)] += lambda;
            }

            let Some(chol) = a.cholesky() else {
                lambda *= 10.0;
                if lambda > LAMBDA_MAX {
                    return Err(FmrError::not_converged("normal equations are singular"));
                }
                continue;
            };
            let step = chol.solve(&b);

            let mut trial: Vec<f64> = (0..p).map(|j| params[j] + step[j] / scale[j]).collect();
            bounds.clamp(&mut trial);

            let trial_pred = eval(&model, &trial, n)?;
            let trial_resid = &y - &trial_pred;
            let trial_sse = trial_resid.norm_squared();

            if trial_sse.is_finite() && trial_sse < sse {
                let reduction = (sse - trial_sse) / sse;
                let step_norm = (0..p)
                    .map(|j| (scale[j] * (trial[j] - params[j])).powi(2))
                    .sum::<f64>()
                    .sqrt();
                let x_norm = (0..p)
                    .map(|j| (scale[j] * trial[j]).powi(2))
                    .sum::<f64>()
                    .sqrt();

                params = trial;
                pred = trial_pred;
                resid = trial_resid;
                sse = trial_sse;
                lambda = (lambda / 10.0).max(LAMBDA_MIN);

                if reduction <= opts.ftol || step_norm <= opts.xtol * (x_norm + opts.xtol) {
                    log::debug!("lm: converged after {} iterations (sse={sse:e})", iter + 1);
                    return finish(&model, params, sse, iter + 1, bounds, n);
                }
                break;
            }

            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                // No direction inside the box lowers the SSE any further.
                log::debug!("lm: damping saturated after {iter} iterations (sse={sse:e})");
                return finish(&model, params, sse, iter, bounds, n);
            }
        }
    }

    Err(FmrError::not_converged(format!(
        "no convergence within {} iterations",
        opts.max_iter
    )))
}

fn eval<F>(model: &F, params: &[f64], n: usize) -> Result<DVector<f64>, FmrError>
where
    F: Fn(&[f64]) -> Result<Vec<f64>, FmrError>,
{
    let out = model(params)?;
    if out.len() != n {
        return Err(FmrError::invalid_input(format!(
            "model returned {} values for {n} observations.",
            out.len()
        )));
    }
    Ok(DVector::from_vec(out))
}

fn jacobian<F>(
    model: &F,
    params: &[f64],
    pred: &DVector<f64>,
    bounds: &Bounds,
) -> Result<DMatrix<f64>, FmrError>
where
    F: Fn(&[f64]) -> Result<Vec<f64>, FmrError>,
{
    let n = pred.len();
    let p = params.len();
    let mut jac = DMatrix::<f64>::zeros(n, p);
    let mut shifted = params.to_vec();

    for j in 0..p {
        let mut h = f64::EPSILON.sqrt() * params[j].abs().max(1.0);
        if params[j] + h > bounds.upper[j] {
            h = -h;
        }
        shifted[j] = params[j] + h;
        let h = shifted[j] - params[j];
        let col = eval(model, &shifted, n)?;
        for i in 0..n {
            let d = (col[i] - pred[i]) / h;
            jac[(i, j)] = if d.is_finite() { d } else { 0.0 };
        }
        shifted[j] = params[j];
    }

    Ok(jac)
}

fn finish<F>(
    model: &F,
    params: Vec<f64>,
    sse: f64,
    iterations: usize,
    bounds: &Bounds,
    n: usize,
) -> Result<LmSolution, FmrError>
where
    F: Fn(&[f64]) -> Result<Vec<f64>, FmrError>,
{
    let pred = eval(model, &params, n)?;
    let jac = jacobian(model, &params, &pred, bounds)?;
    if let Some(j) = (0..jac.ncols()).find(|&j| jac.column(j).iter().all(|&v| v == 0.0)) {
        return Err(FmrError::not_converged(format!(
            "singular Jacobian: parameter {j} has no effect on the model"
        )));
    }
    let covariance = covariance_from_jacobian(&jac, sse);
    Ok(LmSolution {
        params,
        covariance,
        sse,
        iterations,
    })
}
