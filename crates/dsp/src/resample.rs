//! Rational Resampling
//!
//! Resamples by the ratio `p/q` nearest to `new_rate / old_rate`:
//!
//! 1. Downsampling: Kaiser lowpass before interpolation (anti-aliasing)
//! 2. Natural cubic spline evaluated at `i * q / p`
//! 3. Upsampling: the same lowpass after interpolation (anti-imaging)
//!
//! Both FIR passes pad with the edge samples and remove the group delay,
//! so they keep the signal length and introduce no shift.

use crate::spline::CubicSpline;
use crate::DspError;
use std::f64::consts::PI;
use tracing::debug;

/// Passband edge as a fraction of the lower Nyquist rate
const CUTOFF_FRACTION: f64 = 0.9;
/// Transition width as a fraction of the lower Nyquist rate
const TRANSITION_FRACTION: f64 = 0.2;
/// Passband ripple used for the Kaiser order estimate
const RIPPLE: f64 = 0.002;
/// Kaiser window shape
const KAISER_BETA: f64 = 5.0;
/// Ratio approximation tolerance
const RATIO_TOLERANCE: f64 = 1e-12;
/// Upper bound on the anti-aliasing kernel length
const MAX_TAPS: usize = 1 << 16;
/// Upper bound on continued-fraction terms
const MAX_TERMS: usize = 64;

/// Best rational approximation `p/q` of a positive ratio
pub fn rat(value: f64, tolerance: f64) -> Result<(u64, u64), DspError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DspError::InvalidParameter(format!(
            "ratio must be positive and finite, got {value}"
        )));
    }

    // Convergents: [numerator, prev numerator, denominator, prev denominator]
    let mut c = [1.0, 0.0, 0.0, 1.0];
    let mut x = value;
    for _ in 0..MAX_TERMS {
        let d = (x + 0.5).floor();
        x -= d;
        c = [c[0] * d + c[1], c[0], c[2] * d + c[3], c[2]];
        if x == 0.0 || (c[0] / c[2] - value).abs() <= tolerance {
            break;
        }
        x = 1.0 / x;
    }

    let p = (c[0] * c[2].signum()).round();
    let q = c[2].abs().round();
    if p < 1.0 || q < 1.0 {
        return Err(DspError::InvalidParameter(format!(
            "no usable rational approximation for {value}"
        )));
    }
    Ok((p as u64, q as u64))
}

/// Even Kaiser filter order for a ripple and normalized transition width
pub fn kaiser_order(ripple: f64, width: f64) -> usize {
    let attenuation_db = -20.0 * ripple.log10();
    let m = 1.0 + (attenuation_db - 8.0) / (2.285 * 2.0 * PI * width);
    ((m / 2.0).ceil() * 2.0).max(2.0) as usize
}

/// Zeroth-order modified Bessel function of the first kind
fn bessel_i0(x: f64) -> f64 {
    let mut sum = 1.0;
    let mut term = 1.0;
    let mut k = 1.0;
    while term > sum * 1e-8 {
        term *= (x * x) / (4.0 * k * k);
        sum += term;
        k += 1.0;
    }
    sum
}

fn kaiser_window(length: usize, beta: f64) -> Vec<f64> {
    if length == 1 {
        return vec![1.0];
    }
    let norm = bessel_i0(beta);
    (0..length)
        .map(|n| {
            let t = 2.0 * n as f64 / (length - 1) as f64 - 1.0;
            bessel_i0(beta * (1.0 - t * t).max(0.0).sqrt()) / norm
        })
        .collect()
}

/// Kaiser-windowed sinc lowpass with `taps` coefficients.
///
/// `cutoff` is normalized to the sampling rate (1.0 == fs). Taps are scaled
/// by the sum of the unwindowed kernel.
pub fn kaiser_lowpass(taps: usize, cutoff: f64) -> Result<Vec<f64>, DspError> {
    if taps == 0 || taps > MAX_TAPS {
        return Err(DspError::InvalidParameter(format!(
            "kernel length must be in 1..={MAX_TAPS}, got {taps}"
        )));
    }
    let f = cutoff / 2.0;
    let window = kaiser_window(taps, KAISER_BETA);

    let start = (-(taps as f64 - 1.0) / 2.0).floor() as i64;
    let kernel: Vec<f64> = (0..taps as i64)
        .map(|i| {
            let n = (start + i) as f64;
            if n == 0.0 {
                2.0 * PI * f
            } else {
                (2.0 * PI * f * n).sin() / n
            }
        })
        .collect();

    let total: f64 = kernel.iter().sum();
    if total == 0.0 || !total.is_finite() {
        return Err(DspError::InvalidParameter(format!(
            "degenerate lowpass kernel for cutoff {cutoff}"
        )));
    }

    Ok(kernel
        .iter()
        .zip(window.iter())
        .map(|(k, w)| k * w / total)
        .collect())
}

/// Direct-form difference equation with `a[0] == 1`
pub fn lfilter(b: &[f64], a: &[f64], x: &[f64]) -> Vec<f64> {
    let mut y = vec![0.0; x.len()];
    for n in 0..x.len() {
        let mut acc = 0.0;
        for (k, bk) in b.iter().enumerate().take(n + 1) {
            acc += bk * x[n - k];
        }
        for (k, ak) in a.iter().enumerate().skip(1).take(n) {
            acc -= ak * y[n - k];
        }
        y[n] = acc;
    }
    y
}

/// FIR filtering with edge padding and group-delay compensation.
///
/// The output has the same length as `data`.
pub fn firfilt_dc_padded(b: &[f64], data: &[f64]) -> Vec<f64> {
    let (Some(&first), Some(&last)) = (data.first(), data.last()) else {
        return Vec::new();
    };
    let group_delay = b.len().saturating_sub(1) / 2;

    let mut padded = Vec::with_capacity(data.len() + 2 * group_delay);
    padded.extend(std::iter::repeat(first).take(group_delay));
    padded.extend_from_slice(data);
    padded.extend(std::iter::repeat(last).take(group_delay));

    let mut filtered = lfilter(b, &[1.0], &padded);
    filtered.drain(..2 * group_delay);
    filtered
}

/// Resample `data` from `old_rate` to `new_rate`.
///
/// The output has `ceil(len * p / q)` samples where `p/q` approximates the
/// rate ratio.
pub fn resample(data: &[f64], old_rate: f64, new_rate: f64) -> Result<Vec<f64>, DspError> {
    if data.len() < 3 {
        return Err(DspError::TooFewPoints {
            operation: "resample",
            required: 3,
            actual: data.len(),
        });
    }
    if !(old_rate.is_finite() && old_rate > 0.0 && new_rate.is_finite() && new_rate > 0.0) {
        return Err(DspError::InvalidFrequency(format!(
            "cannot resample {old_rate} Hz -> {new_rate} Hz"
        )));
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(DspError::NonFinite("resample input"));
    }

    let (p, q) = rat(new_rate / old_rate, RATIO_TOLERANCE)?;
    let nyquist = if p < q {
        p as f64 / q as f64
    } else {
        q as f64 / p as f64
    };
    let cutoff = CUTOFF_FRACTION * nyquist;
    let width = TRANSITION_FRACTION * nyquist;
    let order = kaiser_order(RIPPLE, width);
    let kernel = kaiser_lowpass(order + 1, cutoff)?;

    debug!(p, q, taps = kernel.len(), "resampling {} samples", data.len());

    let source = if p < q {
        firfilt_dc_padded(&kernel, data)
    } else {
        data.to_vec()
    };

    let knots: Vec<f64> = (0..source.len()).map(|i| i as f64).collect();
    let spline = CubicSpline::new(&knots, &source)?;

    let ratio = p as f64 / q as f64;
    let count = (source.len() as f64 * ratio).ceil() as usize;
    let points: Vec<f64> = (0..count).map(|i| i as f64 / ratio).collect();
    let interpolated = spline.interpolate_many(&points);

    if p > q {
        Ok(firfilt_dc_padded(&kernel, &interpolated))
    } else {
        Ok(interpolated)
    }
}
