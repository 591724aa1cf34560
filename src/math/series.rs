//! Sampled-sequence helpers: finite differences, running integrals, extrema.
//!
//! The gradient uses second-order central differences in the interior and
//! second-order one-sided differences at both ends, on a possibly non-uniform
//! axis. The end stencils are what produce the characteristic edge behaviour of
//! the numerically differentiated line shapes, so they must not be simplified.

/// Derivative of `y` with respect to `x`.
///
/// Sequences with fewer than 3 points cannot carry a second-order stencil: two
/// points get the plain difference quotient on both entries, one point gets 0.
///
/// # Panics
/// Panics if `x` and `y` differ in length.
pub fn gradient(y: &[f64], x: &[f64]) -> Vec<f64> {
    assert_eq!(x.len(), y.len(), "gradient: x and y must have equal length");
    let n = y.len();
    match n {
        0 => return Vec::new(),
        1 => return vec![0.0],
        2 => {
            let d = (y[1] - y[0]) / (x[1] - x[0]);
            return vec![d, d];
        }
        _ => {}
    }

    let mut out = vec![0.0; n];

    for i in 1..n - 1 {
        let hs = x[i] - x[i - 1];
        let hd = x[i + 1] - x[i];
        out[i] = (hs * hs * y[i + 1] + (hd * hd - hs * hs) * y[i] - hd * hd * y[i - 1])
            / (hs * hd * (hd + hs));
    }

    let dx1 = x[1] - x[0];
    let dx2 = x[2] - x[1];
    let a = -(2.0 * dx1 + dx2) / (dx1 * (dx1 + dx2));
    let b = (dx1 + dx2) / (dx1 * dx2);
    let c = -dx1 / (dx2 * (dx1 + dx2));
    out[0] = a * y[0] + b * y[1] + c * y[2];

    let dx1 = x[n - 2] - x[n - 3];
    let dx2 = x[n - 1] - x[n - 2];
    let a = dx2 / (dx1 * (dx1 + dx2));
    let b = -(dx2 + dx1) / (dx1 * dx2);
    let c = (2.0 * dx2 + dx1) / (dx2 * (dx1 + dx2));
    out[n - 1] = a * y[n - 3] + b * y[n - 2] + c * y[n - 1];

    out
}

/// Running trapezoidal integral of `y` over `x`.
///
/// Entry `i` is the integral from `x[0]` to `x[i + 1]`, so the output has one
/// element fewer than the input (empty for fewer than 2 points).
pub fn cumulative_trapezoid(y: &[f64], x: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(y.len().saturating_sub(1));
    let mut acc = 0.0;
    for i in 1..y.len().min(x.len()) {
        acc += 0.5 * (y[i] + y[i - 1]) * (x[i] - x[i - 1]);
        out.push(acc);
    }
    out
}

/// Index of the first maximum (NaN entries are ignored).
pub fn argmax(values: &[f64]) -> Option<usize> {
    extremum(values, |candidate, best| candidate > best)
}

/// Index of the first minimum (NaN entries are ignored).
pub fn argmin(values: &[f64]) -> Option<usize> {
    extremum(values, |candidate, best| candidate < best)
}

fn extremum(values: &[f64], better: impl Fn(f64, f64) -> bool) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some(b) if !better(v, values[b]) => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// `n` evenly spaced points from `start` to `stop` inclusive.
///
/// The last point is exactly `stop`.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n as f64 - 1.0);
            let mut out: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            out[n - 1] = stop;
            out
        }
    }
}

/// Points `start, start + step, …` up to and including `stop`.
///
/// The count is decided once, with a small tolerance, so accumulated rounding
/// neither drops the end point nor adds one past it. Empty when `stop < start`.
pub fn inclusive_range(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || stop < start {
        return Vec::new();
    }
    let n = ((stop - start) / step + 1e-9).floor() as usize + 1;
    (0..n).map(|i| start + step * i as f64).collect()
}
