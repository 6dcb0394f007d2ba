//! Signal Processing Toolbox
//!
//! Numeric building blocks for the vPPG engine:
//! - Butterworth IIR bandpass design with zero-phase filtering
//! - Kaiser-windowed rational resampling
//! - Natural cubic spline interpolation
//! - Peak detection with height, prominence and distance criteria
//! - Moving-average smoothing and window statistics

mod error;
pub mod iir;
pub mod peaks;
pub mod resample;
pub mod smoothing;
pub mod spline;
pub mod stats;

pub use error::DspError;
pub use iir::{BandpassSpec, Biquad, IirFilter};
pub use peaks::{find_peaks, peak_prominences, PeakCriteria};
pub use resample::{firfilt_dc_padded, kaiser_lowpass, kaiser_order, lfilter, rat, resample};
pub use smoothing::{clip, diff, moving_average};
pub use spline::CubicSpline;
pub use stats::{round2, z_score, SignalStats};
