//! Pipeline configuration

use dsp::BandpassSpec;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Signal pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Window length (seconds)
    pub window_secs: u64,

    /// Frames per model step; batches are truncated to a multiple of this
    pub temporal_depth: usize,

    /// Liveness input rate (Hz)
    pub liveness_rate_hz: f64,

    /// Post-filter design
    pub bandpass: BandpassSpec,

    /// Deadline for each oracle call (milliseconds)
    pub oracle_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_secs: 10,
            temporal_depth: 10,
            liveness_rate_hz: 128.0,
            bandpass: BandpassSpec::vppg(),
            oracle_timeout_ms: 5000,
        }
    }
}

impl PipelineConfig {
    /// Same settings with a different window length
    pub fn with_window(window_secs: u64) -> Self {
        Self {
            window_secs,
            ..Default::default()
        }
    }

    /// Window length in milliseconds
    pub fn window_ms(&self) -> i64 {
        self.window_secs as i64 * 1000
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.oracle_timeout_ms)
    }
}
