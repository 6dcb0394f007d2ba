//! Head-shake detection
//!
//! The yaw trace of a window is resampled to a fixed length, smoothed and
//! re-centered so a frontal pose sits at 0°. Turns to either side are then
//! counted as peaks. When no peak qualifies, a single long turn (a step
//! between two stable poses) still counts.

use dsp::{clip, diff, find_peaks, moving_average, CubicSpline, PeakCriteria, SignalStats};
use tracing::{trace, warn};

/// Points in the resampled yaw trace
const RESAMPLED_POINTS: usize = 200;
/// Yaw saturation (degrees)
const YAW_LIMIT: f64 = 160.0;
/// Smoothing window over the resampled trace
const TRACE_WINDOW: usize = 10;
/// Smoothing window over each side trace
const SIDE_WINDOW: usize = 3;
/// Side traces keep values beyond this magnitude
const SIDE_THRESHOLD: f64 = 15.0;

/// Long-turn derivative step
const LONG_TURN_STEP: usize = 3;
/// Long-turn derivative magnitude
const LONG_TURN_THRESHOLD: f64 = 6.0;
/// Samples skipped on each side of the turn
const LONG_TURN_MARGIN: usize = 10;
/// Maximum spread of a stable segment
const STABLE_MAX_STD: f64 = 2.0;
/// Minimum offset of a turned segment
const TURNED_MIN_MEAN: f64 = 20.0;

/// Count head shakes in a yaw sequence (degrees)
pub fn head_shake_count(yaw: &[f64]) -> u32 {
    let n = yaw.len();
    if n < 3 {
        return 0;
    }

    let knots: Vec<f64> = (0..n).map(|i| i as f64 / (n - 1) as f64).collect();
    let spline = match CubicSpline::new(&knots, yaw) {
        Ok(spline) => spline,
        Err(e) => {
            warn!("Head-shake spline failed: {}", e);
            return 0;
        }
    };
    let points: Vec<f64> = (0..RESAMPLED_POINTS)
        .map(|j| j as f64 / (RESAMPLED_POINTS - 1) as f64)
        .collect();
    let trace = clip(&spline.interpolate_many(&points), YAW_LIMIT);

    let centered = normalize_head_pose(
        &moving_average(&trace, TRACE_WINDOW),
        -60.0,
        60.0,
        30.0,
        150.0,
    );

    let left: Vec<f64> = centered
        .iter()
        .map(|&v| if v > -SIDE_THRESHOLD { 0.0 } else { v })
        .collect();
    let right: Vec<f64> = centered
        .iter()
        .map(|&v| if v < SIDE_THRESHOLD { 0.0 } else { v })
        .collect();
    let left = moving_average(&left, SIDE_WINDOW);
    let right = moving_average(&right, SIDE_WINDOW);

    let criteria = PeakCriteria::head_shake();
    let left_magnitude: Vec<f64> = left.iter().map(|v| v.abs()).collect();
    let peaks = count_peaks(&left_magnitude, &criteria) + count_peaks(&right, &criteria);
    trace!(peaks, "head-shake peaks");

    if peaks > 0 {
        return peaks;
    }
    detect_long_head_pose(&left) + detect_long_head_pose(&right)
}

fn count_peaks(trace: &[f64], criteria: &PeakCriteria) -> u32 {
    match find_peaks(trace, criteria) {
        Ok(peaks) => peaks.len() as u32,
        Err(e) => {
            warn!("Peak detection failed: {}", e);
            0
        }
    }
}

/// Map a yaw range onto `[min, max]`.
///
/// With `(-60, 60, 30, 150)` a frontal yaw of 90° maps to 0°.
pub fn normalize_head_pose(data: &[f64], min: f64, max: f64, min_mp: f64, max_mp: f64) -> Vec<f64> {
    data.iter()
        .map(|v| ((v - min_mp) / (max_mp - min_mp)) * (max - min) - max)
        .collect()
}

/// Count turned, stable segments on either side of the central turn
pub fn detect_long_head_pose(trace: &[f64]) -> u32 {
    let steps: Vec<usize> = diff(trace, LONG_TURN_STEP)
        .iter()
        .enumerate()
        .filter(|(_, d)| d.abs() > LONG_TURN_THRESHOLD)
        .map(|(i, _)| i)
        .collect();

    let Some(&middle) = steps.get(steps.len() / 2) else {
        return 0;
    };

    let before_end = middle.saturating_sub(LONG_TURN_MARGIN);
    let after_start = (middle + LONG_TURN_MARGIN).min(trace.len());
    let segments = [&trace[..before_end], &trace[after_start..]];
    if segments.iter().any(|s| s.is_empty()) {
        return 0;
    }

    segments
        .iter()
        .map(|segment| SignalStats::compute(segment))
        .filter(|stats| stats.std_dev <= STABLE_MAX_STD && stats.mean.abs() > TURNED_MIN_MEAN)
        .count() as u32
}
