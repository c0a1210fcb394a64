//! Adaptive moving-average thresholding, the default strategy.

use crate::detectors::BeatDetector;
use crate::error::{Error, Result};
use crate::signal::Beats;

/// Margin applied to the whole threshold curve, keeping it above the noise
/// floor so isolated spikes do not register as beats.
const THRESHOLD_MARGIN: f64 = 1.2;

/// Detects beats as contiguous runs of samples above an adaptive threshold
/// built from a trailing moving average of the signal.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdDetector {
    /// Moving-average window width as a fraction of the sampling frequency.
    pub window_factor: f64,
}

impl Default for ThresholdDetector {
    fn default() -> Self {
        Self { window_factor: 0.5 }
    }
}

impl BeatDetector for ThresholdDetector {
    fn detect(&self, filtered: &[f64], fs: f64) -> Result<Beats> {
        if filtered.len() < 2 {
            return Err(Error::InsufficientData {
                needed: 2,
                got: filtered.len(),
            });
        }
        let window = ((self.window_factor * fs).round() as usize).max(1);
        let global_mean = mean(filtered);
        let min = filtered.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        let offset = (global_mean - min).abs() / 2.0;
        let threshold: Vec<f64> = rolling_mean(filtered, window)
            .into_iter()
            .map(|m| (m.unwrap_or(global_mean) + offset) * THRESHOLD_MARGIN)
            .collect();
        Ok(Beats::from_indices(scan_windows(filtered, &threshold)))
    }
}

/// Trailing moving average; positions without a full window of history are
/// `None` and get backfilled with the global mean by the caller.
fn rolling_mean(data: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(data.len());
    let mut acc = 0.0;
    for (i, &sample) in data.iter().enumerate() {
        acc += sample;
        if i >= window {
            acc -= data[i - window];
        }
        if i + 1 >= window {
            out.push(Some(acc / window as f64));
        } else {
            out.push(None);
        }
    }
    out
}

/// One pass over the signal against its threshold curve. A contiguous run
/// of above-threshold samples is one candidate window; closing it emits the
/// index of the window's maximum, first occurrence winning ties.
fn scan_windows(data: &[f64], threshold: &[f64]) -> Vec<usize> {
    let mut beats = Vec::new();
    let mut current: Option<(usize, f64)> = None;
    for (i, (&sample, &limit)) in data.iter().zip(threshold).enumerate() {
        if sample > limit {
            match current {
                Some((_, best)) if best >= sample => {}
                _ => current = Some((i, sample)),
            }
        } else if let Some((peak, _)) = current.take() {
            beats.push(peak);
        }
    }
    if let Some((peak, _)) = current {
        beats.push(peak);
    }
    beats
}

fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}
