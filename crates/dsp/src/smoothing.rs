//! Smoothing Helpers

use crate::stats::round2;

/// Centered moving average with edge padding.
///
/// Each full window mean is rounded to two decimals. The `window / 2` slots
/// at the front repeat the first full mean and the same number of slots at
/// the back repeat the last one, so the output has
/// `len - window + 1 + 2 * (window / 2)` values. Input shorter than the
/// window is returned unchanged.
pub fn moving_average(data: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || data.len() < window {
        return data.to_vec();
    }

    let pad = window / 2;
    let mut out = Vec::with_capacity(data.len() + 2 * pad);
    out.resize(pad, 0.0);

    let mut sum: f64 = data[..window].iter().sum();
    out.push(round2(sum / window as f64));
    for i in window..data.len() {
        sum += data[i] - data[i - window];
        out.push(round2(sum / window as f64));
    }

    let first = out[pad];
    out[..pad].fill(first);
    let last = out[out.len() - 1];
    out.extend(std::iter::repeat(last).take(pad));
    out
}

/// Clamp each value to `[-limit, limit]`
pub fn clip(data: &[f64], limit: f64) -> Vec<f64> {
    data.iter().map(|v| v.clamp(-limit, limit)).collect()
}

/// First differences with a step: `data[i + step] - data[i]`
pub fn diff(data: &[f64], step: usize) -> Vec<f64> {
    if step == 0 || data.len() <= step {
        return Vec::new();
    }
    data.iter()
        .zip(data.iter().skip(step))
        .map(|(a, b)| b - a)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_average_window_three() {
        let out = moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(out, vec![2.0, 2.0, 3.0, 4.0, 4.0]);
    }

    #[test]
    fn test_moving_average_even_window_length() {
        let data: Vec<f64> = (0..20).map(|v| v as f64).collect();
        let out = moving_average(&data, 10);
        assert_eq!(out.len(), 20 - 10 + 1 + 10);
        assert_eq!(out[0], 4.5);
        assert_eq!(out[5], 4.5);
        assert_eq!(out[out.len() - 1], 14.5);
    }

    #[test]
    fn test_moving_average_rounds() {
        let out = moving_average(&[0.0, 0.0, 1.0], 3);
        assert_eq!(out, vec![0.33, 0.33, 0.33]);
    }

    #[test]
    fn test_moving_average_short_input() {
        assert_eq!(moving_average(&[1.0, 2.0], 3), vec![1.0, 2.0]);
    }

    #[test]
    fn test_clip_keeps_sign() {
        assert_eq!(clip(&[-200.0, -10.0, 170.0], 160.0), vec![-160.0, -10.0, 160.0]);
    }

    #[test]
    fn test_diff_with_step() {
        assert_eq!(diff(&[1.0, 2.0, 4.0, 8.0], 2), vec![3.0, 6.0]);
        assert!(diff(&[1.0], 1).is_empty());
    }
}
