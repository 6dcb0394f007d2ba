//! Butterworth IIR Bandpass Filters
//!
//! Biquad cascades designed with the RBJ cookbook bandpass (constant 0 dB
//! peak gain). The vPPG passband is centered on 1.625 Hz, which covers
//! 45-150 bpm.

use crate::DspError;
use serde::{Deserialize, Serialize};
use std::f64::consts::{LN_2, PI};

/// Maximum number of cascaded biquads
const MAX_ORDER: usize = 12;

/// Bandpass design parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandpassSpec {
    /// Center frequency (Hz)
    pub center_hz: f64,
    /// Bandwidth term of the RBJ design, `None` selects the Butterworth Q
    pub bandwidth: Option<f64>,
    /// Number of cascaded biquads
    pub order: usize,
}

impl Default for BandpassSpec {
    fn default() -> Self {
        Self::vppg()
    }
}

impl BandpassSpec {
    /// Pulse band used for vPPG post-filtering
    pub fn vppg() -> Self {
        Self {
            center_hz: 1.625,
            bandwidth: Some(1.75),
            order: 1,
        }
    }

    /// Design the filter cascade for a sampling rate
    pub fn design(&self, sample_rate: f64) -> Result<IirFilter, DspError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(DspError::InvalidFrequency(format!(
                "sampling rate must be positive, got {sample_rate}"
            )));
        }
        let nyquist = sample_rate / 2.0;
        if !(self.center_hz > 0.0 && self.center_hz < nyquist) {
            return Err(DspError::InvalidFrequency(format!(
                "center {} Hz outside (0, {nyquist}) Hz at {sample_rate} Hz",
                self.center_hz
            )));
        }
        if self.order == 0 || self.order > MAX_ORDER {
            return Err(DspError::InvalidParameter(format!(
                "order must be in 1..={MAX_ORDER}, got {}",
                self.order
            )));
        }
        if let Some(bw) = self.bandwidth {
            if !(bw > 0.0) {
                return Err(DspError::InvalidParameter(format!(
                    "bandwidth must be positive, got {bw}"
                )));
            }
        }

        let stages = (0..self.order)
            .map(|k| {
                let q = butterworth_q(self.order, k);
                Biquad::bandpass(sample_rate, self.center_hz, q, self.bandwidth)
            })
            .collect();

        Ok(IirFilter { stages })
    }
}

/// Q of stage `k` in an `order`-stage Butterworth cascade
fn butterworth_q(order: usize, k: usize) -> f64 {
    let theta = (2 * k + 1) as f64 * PI / (4 * order) as f64;
    1.0 / (2.0 * theta.sin())
}

/// Second-order section with normalized denominator (`a0 == 1`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    /// Feed-forward coefficients b0, b1, b2
    pub b: [f64; 3],
    /// Feedback coefficients a1, a2
    pub a: [f64; 2],
}

impl Biquad {
    /// RBJ bandpass with constant 0 dB peak gain
    pub fn bandpass(sample_rate: f64, center_hz: f64, q: f64, bandwidth: Option<f64>) -> Self {
        let w = 2.0 * PI * center_hz / sample_rate;
        let (sin_w, cos_w) = w.sin_cos();
        let alpha = match bandwidth {
            Some(bw) => sin_w * (LN_2 / 2.0 * bw * w / sin_w).sinh(),
            None => sin_w / (2.0 * q),
        };
        let a0 = 1.0 + alpha;

        Self {
            b: [alpha / a0, 0.0, -alpha / a0],
            a: [(-2.0 * cos_w) / a0, (1.0 - alpha) / a0],
        }
    }

    /// Transposed direct form II step
    fn step(&self, x: f64, z: &mut [f64; 2]) -> f64 {
        let y = self.b[0] * x + z[0];
        z[0] = self.b[1] * x - self.a[0] * y + z[1];
        z[1] = self.b[2] * x - self.a[1] * y;
        y
    }
}

/// Cascade of biquad sections
#[derive(Debug, Clone, PartialEq)]
pub struct IirFilter {
    stages: Vec<Biquad>,
}

impl IirFilter {
    /// Sections of the cascade
    pub fn stages(&self) -> &[Biquad] {
        &self.stages
    }

    /// Causal filtering from a zero initial state
    pub fn filter(&self, input: &[f64]) -> Vec<f64> {
        let mut state = vec![[0.0; 2]; self.stages.len()];
        input
            .iter()
            .map(|&x| {
                self.stages
                    .iter()
                    .zip(state.iter_mut())
                    .fold(x, |acc, (stage, z)| stage.step(acc, z))
            })
            .collect()
    }

    /// Zero-phase forward-backward filtering.
    ///
    /// Each pass starts from a zero state; the magnitude response is squared.
    pub fn filtfilt(&self, input: &[f64]) -> Vec<f64> {
        let forward = self.filter(input);
        let reversed: Vec<f64> = forward.into_iter().rev().collect();
        let mut output = self.filter(&reversed);
        output.reverse();
        output
    }
}
