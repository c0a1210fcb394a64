pub mod condition;
pub mod detectors;
pub mod error;
pub mod io;
pub mod metrics;
pub mod signal;
pub mod warn;

pub use detectors::{BeatDetector, CorrelationDetector, ThresholdDetector};
pub use error::{Error, Result};
pub use metrics::Metrics;
pub use signal::{Beats, Recording};
pub use warn::{BufferSink, LogSink, WarnSink};

/// Run conditioning, beat detection and metrics assembly over one loaded
/// recording. Stages run in order, each consuming its predecessor's output;
/// advisories accumulate in the sink without changing any value.
pub fn analyze(
    recording: &Recording,
    detector: &dyn BeatDetector,
    sink: &mut dyn WarnSink,
) -> Result<Metrics> {
    let duration = condition::duration(&recording.time, sink);
    let fs = condition::sampling_frequency(&recording.time)?;
    let extremes = condition::voltage_extremes(&recording.voltage, sink);
    let filtered = condition::smooth(&recording.voltage)?;
    let beats = detector.detect(&filtered, fs)?;
    metrics::build(recording, duration, extremes, &beats, sink)
}
