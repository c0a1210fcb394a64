//! Signal statistics and smoothing applied before beat detection.

use crate::error::{Error, Result};
use crate::warn::WarnSink;

/// Smoothing window length in samples. Must stay odd.
pub const SMOOTH_WINDOW: usize = 17;
/// Polynomial order of the smoothing fit.
pub const SMOOTH_ORDER: usize = 8;

/// Recordings shorter than this many seconds trigger an advisory.
const LOW_DURATION_S: f64 = 10.0;
/// Absolute voltage beyond this bound is outside physiological range.
const VOLTAGE_BOUND: f64 = 300.0;

/// Span of the time axis. Advisory when the recording is shorter than
/// ten seconds; the value is returned either way.
pub fn duration(time: &[f64], sink: &mut dyn WarnSink) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &t in time {
        min = min.min(t);
        max = max.max(t);
    }
    if time.is_empty() {
        return 0.0;
    }
    let dur = max - min;
    if dur < LOW_DURATION_S {
        sink.warn(&format!("short recording: {:.3} s of signal", dur));
    }
    dur
}

/// Minimum and maximum voltage. Advisory when either magnitude exceeds the
/// physiological bound; the values are returned unchanged.
pub fn voltage_extremes(voltage: &[f64], sink: &mut dyn WarnSink) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in voltage {
        min = min.min(v);
        max = max.max(v);
    }
    if min.abs() > VOLTAGE_BOUND || max.abs() > VOLTAGE_BOUND {
        sink.warn(&format!(
            "voltage extremes ({}, {}) outside physiological range",
            min, max
        ));
    }
    (min, max)
}

/// Sampling frequency from the first interval of the time axis. Uniform
/// spacing is assumed; irregular recordings are not detected here.
pub fn sampling_frequency(time: &[f64]) -> Result<f64> {
    if time.len() < 2 {
        return Err(Error::InsufficientData {
            needed: 2,
            got: time.len(),
        });
    }
    Ok(1.0 / (time[1] - time[0]))
}

/// Savitzky-Golay smoothing pass over the voltage sequence.
///
/// Each output sample is the value at its own position of a least-squares
/// polynomial fitted to the surrounding window; the leading and trailing
/// half-windows evaluate the polynomial fitted to the first and last full
/// window. Peak positions survive the pass, which is what the detectors
/// rely on.
pub fn smooth(voltage: &[f64]) -> Result<Vec<f64>> {
    let n = voltage.len();
    if n < SMOOTH_WINDOW {
        return Err(Error::InsufficientData {
            needed: SMOOTH_WINDOW,
            got: n,
        });
    }
    let half = SMOOTH_WINDOW / 2;
    let centre = fit_weights(SMOOTH_WINDOW, SMOOTH_ORDER, 0.0);
    let mut out = vec![0.0; n];
    for i in half..n - half {
        out[i] = dot(&centre, &voltage[i - half..=i + half]);
    }
    for i in 0..half {
        let lead = fit_weights(SMOOTH_WINDOW, SMOOTH_ORDER, i as f64 - half as f64);
        out[i] = dot(&lead, &voltage[..SMOOTH_WINDOW]);
        let trail = fit_weights(SMOOTH_WINDOW, SMOOTH_ORDER, half as f64 - i as f64);
        out[n - 1 - i] = dot(&trail, &voltage[n - SMOOTH_WINDOW..]);
    }
    Ok(out)
}

/// Convolution weights that evaluate the window's least-squares polynomial
/// at `offset` samples from the window centre.
///
/// The abscissa is scaled to [-1, 1] before forming the normal equations;
/// the fitted polynomial is invariant under that scaling and the Gram
/// matrix stays well conditioned.
fn fit_weights(window: usize, order: usize, offset: f64) -> Vec<f64> {
    let half = (window / 2) as f64;
    let xs: Vec<f64> = (0..window).map(|j| (j as f64 - half) / half).collect();

    let mut power_sums = vec![0.0; 2 * order + 1];
    for &x in &xs {
        let mut p = 1.0;
        for sum in power_sums.iter_mut() {
            *sum += p;
            p *= x;
        }
    }
    let mut gram = vec![vec![0.0; order + 1]; order + 1];
    for (i, row) in gram.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = power_sums[i + j];
        }
    }
    let mut rhs = vec![0.0; order + 1];
    let scaled = offset / half;
    let mut p = 1.0;
    for cell in rhs.iter_mut() {
        *cell = p;
        p *= scaled;
    }
    let coef = solve(gram, rhs);

    xs.iter()
        .map(|&x| {
            let mut p = 1.0;
            let mut w = 0.0;
            for &c in &coef {
                w += c * p;
                p *= x;
            }
            w
        })
        .collect()
}

/// Gaussian elimination with partial pivoting. The Gram matrix is positive
/// definite for window > order, so the pivots stay nonzero.
fn solve(mut matrix: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Vec<f64> {
    let n = rhs.len();
    for col in 0..n {
        let mut pivot = col;
        for row in col + 1..n {
            if matrix[row][col].abs() > matrix[pivot][col].abs() {
                pivot = row;
            }
        }
        matrix.swap(col, pivot);
        rhs.swap(col, pivot);
        let diag = matrix[col][col];
        for row in col + 1..n {
            let factor = matrix[row][col] / diag;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                matrix[row][k] -= factor * matrix[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }
    let mut out = vec![0.0; n];
    for row in (0..n).rev() {
        let mut acc = rhs[row];
        for k in row + 1..n {
            acc -= matrix[row][k] * out[k];
        }
        out[row] = acc / matrix[row][row];
    }
    out
}

fn dot(weights: &[f64], samples: &[f64]) -> f64 {
    weights.iter().zip(samples).map(|(w, s)| w * s).sum()
}
