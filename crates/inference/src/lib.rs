//! Inference Seams
//!
//! The neural models behind the engine are black boxes reached through
//! async traits. Every call returns an `OracleResult`; callers decide the
//! fallback value.

pub mod mock;
mod oracle;
mod timeout;
mod types;

pub use oracle::{FaceDetector, LandmarkEstimator, LivenessOracle, StressEstimator, WaveformOracle};
pub use timeout::with_timeout;
pub use types::{BoundingBox, FrameBatch, LandmarkEstimate, ModelVariant};

use thiserror::Error;

/// Errors at an oracle boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OracleError {
    #[error("Oracle timeout after {0}ms")]
    Timeout(u64),
    #[error("Model not loaded: {0}")]
    NotLoaded(String),
    #[error("Resources exhausted: {0}")]
    ResourceExhausted(String),
    #[error("Invalid oracle input: {0}")]
    InvalidInput(String),
    #[error("Oracle failed: {0}")]
    Failed(String),
}

/// Tagged result of an oracle call
pub type OracleResult<T> = Result<T, OracleError>;
