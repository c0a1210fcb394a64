//! Final summary record assembled from detector output and signal
//! statistics.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::signal::{Beats, Recording};
use crate::warn::WarnSink;

/// Plausible resting-to-exercise heart rate range in beats per minute;
/// rates outside it are reported but flagged.
const PLAUSIBLE_BPM: (f64, f64) = (40.0, 180.0);

/// Summary of one analyzed recording. Field names and shapes are a
/// compatibility contract with downstream consumers; the record is built
/// once per run and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub mean_hr_bpm: f64,
    #[serde(rename = "voltage extremes")]
    pub voltage_extremes: [f64; 2],
    pub duration: f64,
    pub num_beats: usize,
    pub beats: Vec<f64>,
}

/// Assemble the metrics record. The beat list maps back to beat times via
/// the recording's time axis; everything upstream of the rate stays valid
/// even when the rate itself fails.
pub fn build(
    recording: &Recording,
    duration: f64,
    extremes: (f64, f64),
    beats: &Beats,
    sink: &mut dyn WarnSink,
) -> Result<Metrics> {
    let beat_times: Vec<f64> = beats.indices.iter().map(|&i| recording.time[i]).collect();
    let mean_hr_bpm = mean_rate_bpm(beats.len(), duration, sink)?;
    Ok(Metrics {
        mean_hr_bpm,
        voltage_extremes: [extremes.0, extremes.1],
        duration,
        num_beats: beats.len(),
        beats: beat_times,
    })
}

/// Average rate over the whole recording. Advisory when the result falls
/// outside the plausible human range; the value is returned unchanged.
pub fn mean_rate_bpm(num_beats: usize, duration: f64, sink: &mut dyn WarnSink) -> Result<f64> {
    if duration == 0.0 {
        return Err(Error::ZeroDuration);
    }
    let bpm = num_beats as f64 / (duration / 60.0);
    if bpm < PLAUSIBLE_BPM.0 || bpm > PLAUSIBLE_BPM.1 {
        sink.warn(&format!("mean heart rate {:.1} bpm outside plausible range", bpm));
    }
    Ok(bpm)
}
