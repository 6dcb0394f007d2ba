//! DSP Error Types

use thiserror::Error;

/// Errors raised by the signal processing toolbox
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DspError {
    /// Paired arrays differ in length
    #[error("length mismatch: x has {x_len} values, y has {y_len}")]
    LengthMismatch { x_len: usize, y_len: usize },

    /// Not enough samples for the requested operation
    #[error("{operation} needs at least {required} points, got {actual}")]
    TooFewPoints {
        operation: &'static str,
        required: usize,
        actual: usize,
    },

    /// Knot abscissae must be distinct
    #[error("x values must be distinct (repeated after index {index})")]
    NonDistinct { index: usize },

    /// Input contains NaN or infinity
    #[error("{0} contains non-finite values")]
    NonFinite(&'static str),

    /// Sampling or corner frequency outside the usable range
    #[error("invalid frequency: {0}")]
    InvalidFrequency(String),

    /// Invalid window, kernel or detector parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
