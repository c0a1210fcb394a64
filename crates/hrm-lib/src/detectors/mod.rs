pub mod correlate;
pub mod threshold;

pub use correlate::CorrelationDetector;
pub use threshold::ThresholdDetector;

use crate::error::Result;
use crate::signal::Beats;

/// One beat-detection strategy.
///
/// Implementations take the smoothed voltage sequence and the sampling
/// frequency and return the beat positions as sample indices, strictly
/// increasing. Strategies are interchangeable behind this trait.
pub trait BeatDetector {
    fn detect(&self, filtered: &[f64], fs: f64) -> Result<Beats>;
}
