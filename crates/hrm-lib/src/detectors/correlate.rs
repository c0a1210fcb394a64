//! Self-correlation against a one-period template, the alternative strategy.
//!
//! The filtered signal is cross-correlated with its own first sampling
//! period (mean-centred), and peaks of the correlation sequence are located
//! with a multi-scale Ricker-wavelet peak finder. Correlation keeps finding
//! periodicity when amplitude-based thresholds drift, at the price of
//! needing one clean period up front.

use std::f64::consts::PI;

use crate::detectors::BeatDetector;
use crate::error::{Error, Result};
use crate::signal::Beats;

/// Scales a ridge may skip while still being extended.
const RIDGE_GAP: usize = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationDetector;

impl BeatDetector for CorrelationDetector {
    fn detect(&self, filtered: &[f64], fs: f64) -> Result<Beats> {
        let period = fs.floor() as usize;
        if period == 0 || period > filtered.len() {
            return Err(Error::InsufficientData {
                needed: period.max(1),
                got: filtered.len(),
            });
        }
        let mean = filtered.iter().sum::<f64>() / filtered.len() as f64;
        let template: Vec<f64> = filtered[..period].iter().map(|v| v - mean).collect();
        let corr = cross_correlate(filtered, &template);
        let lags = multiscale_peaks(&corr, period);

        // A correlation peak at lag k aligns the template with the signal
        // window starting at k - (len - 1); the beat is that window's
        // maximum. Windows clipped at either edge still snap to the
        // nearest real peak.
        let mut beats = Vec::new();
        for lag in lags {
            let start = lag.saturating_sub(template.len() - 1);
            if start >= filtered.len() {
                continue;
            }
            let end = (start + period).min(filtered.len());
            beats.push(start + argmax(&filtered[start..end]));
        }
        beats.sort_unstable();
        beats.dedup();
        Ok(Beats::from_indices(beats))
    }
}

/// Full cross-correlation, output length `signal + template - 1`.
fn cross_correlate(signal: &[f64], template: &[f64]) -> Vec<f64> {
    let n = signal.len() as isize;
    let m = template.len() as isize;
    let mut out = vec![0.0; (n + m - 1) as usize];
    for (k, slot) in out.iter_mut().enumerate() {
        let base = k as isize - (m - 1);
        let mut acc = 0.0;
        for (j, &t) in template.iter().enumerate() {
            let pos = base + j as isize;
            if pos >= 0 && pos < n {
                acc += signal[pos as usize] * t;
            }
        }
        *slot = acc;
    }
    out
}

/// Peak finding across candidate widths `1..=max_width`.
///
/// Convolves the sequence with a Ricker wavelet per width and links local
/// maxima into ridges from the coarsest scale down, tolerating a drift of
/// a quarter width per step and short gaps. Ridges present at fewer than a
/// quarter of the scales are noise and dropped; surviving ridges report
/// their position at the finest scale they reached.
fn multiscale_peaks(data: &[f64], max_width: usize) -> Vec<usize> {
    if data.len() < 3 {
        return Vec::new();
    }
    let widths: Vec<usize> = (1..=max_width.max(1)).collect();
    let min_length = (widths.len() / 4).max(1);

    struct Ridge {
        col: usize,
        length: usize,
        gap: usize,
    }
    let mut ridges: Vec<Ridge> = Vec::new();

    for &width in widths.iter().rev() {
        let points = (10 * width).min(data.len());
        let row = convolve_same(data, &ricker(points, width as f64));
        let maxima = local_maxima(&row);
        let tolerance = (width / 4).max(1);
        let mut used = vec![false; maxima.len()];

        for ridge in ridges.iter_mut() {
            if ridge.gap > RIDGE_GAP {
                continue;
            }
            ridge.gap += 1;
            let mut best: Option<usize> = None;
            for (slot, &col) in maxima.iter().enumerate() {
                if used[slot] || col.abs_diff(ridge.col) > tolerance {
                    continue;
                }
                let closer = match best {
                    Some(prev) => col.abs_diff(ridge.col) < maxima[prev].abs_diff(ridge.col),
                    None => true,
                };
                if closer {
                    best = Some(slot);
                }
            }
            if let Some(slot) = best {
                used[slot] = true;
                ridge.col = maxima[slot];
                ridge.length += 1;
                ridge.gap = 0;
            }
        }
        for (slot, &col) in maxima.iter().enumerate() {
            if !used[slot] {
                ridges.push(Ridge {
                    col,
                    length: 1,
                    gap: 0,
                });
            }
        }
    }

    let mut peaks: Vec<usize> = ridges
        .iter()
        .filter(|r| r.length >= min_length)
        .map(|r| r.col)
        .collect();
    peaks.sort_unstable();
    peaks.dedup();
    peaks
}

/// Ricker ("Mexican hat") wavelet over `points` samples.
fn ricker(points: usize, width: f64) -> Vec<f64> {
    let norm = 2.0 / ((3.0 * width).sqrt() * PI.powf(0.25));
    let centre = (points as f64 - 1.0) / 2.0;
    (0..points)
        .map(|i| {
            let sq = ((i as f64 - centre) / width).powi(2);
            norm * (1.0 - sq) * (-sq / 2.0).exp()
        })
        .collect()
}

/// Convolution trimmed to the input length, centred on the kernel.
fn convolve_same(data: &[f64], kernel: &[f64]) -> Vec<f64> {
    let n = data.len() as isize;
    let shift = ((kernel.len() - 1) / 2) as isize;
    let mut out = vec![0.0; data.len()];
    for (i, slot) in out.iter_mut().enumerate() {
        let mut acc = 0.0;
        for (j, &k) in kernel.iter().enumerate() {
            let pos = i as isize + shift - j as isize;
            if pos >= 0 && pos < n {
                acc += data[pos as usize] * k;
            }
        }
        *slot = acc;
    }
    out
}

fn local_maxima(row: &[f64]) -> Vec<usize> {
    (1..row.len().saturating_sub(1))
        .filter(|&i| row[i] > row[i - 1] && row[i] > row[i + 1])
        .collect()
}

fn argmax(data: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in data.iter().enumerate() {
        if v > data[best] {
            best = i;
        }
    }
    best
}
