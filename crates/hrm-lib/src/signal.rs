use serde::{Deserialize, Serialize};

/// Two-column ECG recording, index-aligned.
///
/// `time` is assumed strictly increasing with uniform spacing; rows keep the
/// order they had in the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Timestamps in seconds
    pub time: Vec<f64>,
    /// Electrode voltage per timestamp
    pub voltage: Vec<f64>,
}

impl Recording {
    pub fn len(&self) -> usize {
        self.time.len()
    }
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Detected beat positions as sample indices, strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beats {
    pub indices: Vec<usize>,
}

impl Beats {
    pub fn from_indices(indices: Vec<usize>) -> Self {
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
