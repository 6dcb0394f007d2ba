//! vPPG Signal Pipeline
//!
//! Turns one window of face patches into a Forecast Record:
//! 1. Appearance and motion branches, z-score normalized
//! 2. vPPG oracle → raw per-frame waveform
//! 3. Zero-phase bandpass at the native rate
//! 4. Liveness on a 128 Hz z-scored copy
//! 5. Attention score from presence and head shakes

mod config;
mod normalize;
mod pipeline;
mod record;
mod score;

pub use config::PipelineConfig;
pub use normalize::{build_branches, Branches};
pub use pipeline::{SignalPipeline, WindowContext, WindowOutput};
pub use record::ForecastRecord;
pub use score::attention_score;

use dsp::DspError;
use inference::OracleError;
use thiserror::Error;

/// Reasons a window yields no record
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No frames in window")]
    NoFrames,

    #[error("{frames} frames cannot fill a batch of depth {depth}")]
    TooFewFrames { frames: usize, depth: usize },

    #[error("Patch shape mismatch: expected {expected:?}, got {actual:?}")]
    PatchShape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Waveform oracle failed: {0}")]
    Oracle(#[from] OracleError),

    #[error("Waveform oracle returned no usable samples")]
    EmptyWaveform,

    #[error("Post-filter failed: {0}")]
    Filter(#[from] DspError),
}
