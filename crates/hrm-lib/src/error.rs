use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal failures of the beat-detection pipeline.
///
/// Malformed rows are not represented here: the loader drops them locally
/// and reports each one through the warning sink.
#[derive(Debug, Error)]
pub enum Error {
    /// The input path does not name a CSV recording.
    #[error("{}: expected a .csv recording", path.display())]
    Format { path: PathBuf },

    /// The input path is missing or unreadable.
    #[error("{}: {source}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The recording is too short for the requested computation.
    #[error("recording too short: need {needed} samples, found {got}")]
    InsufficientData { needed: usize, got: usize },

    /// A mean heart rate was requested over a zero-length recording.
    #[error("recording spans zero time; mean heart rate is undefined")]
    ZeroDuration,
}
