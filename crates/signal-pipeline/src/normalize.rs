//! Appearance and motion branches

use crate::PipelineError;
use frame_buffer::FrameSample;
use inference::FrameBatch;
use ndarray::{s, Axis, Zip};
use std::sync::Arc;
use tracing::debug;

/// Model inputs for one window
#[derive(Debug, Clone)]
pub struct Branches {
    /// Z-scored raw patches
    pub appearance: FrameBatch,
    /// Z-scored normalized frame differences
    pub motion: FrameBatch,
}

impl Branches {
    /// Frames per branch
    pub fn len(&self) -> usize {
        self.appearance.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build both branches from a window of frames.
///
/// Motion frame `i` is `(f[i+1] - f[i]) / (f[i+1] + f[i])`, 0 where the sum
/// is 0. Each branch is z-scored over the whole window, then both are cut to
/// the largest multiple of `depth` not above `N - 1`.
pub fn build_branches(frames: &[Arc<FrameSample>], depth: usize) -> Result<Branches, PipelineError> {
    let Some(first) = frames.first() else {
        return Err(PipelineError::NoFrames);
    };
    let depth = depth.max(1);
    let usable = (frames.len().saturating_sub(1) / depth) * depth;
    if usable == 0 {
        return Err(PipelineError::TooFewFrames {
            frames: frames.len(),
            depth,
        });
    }

    let shape = first.patch.shape().to_vec();
    let (h, w, c) = first.patch.dim();
    let mut stacked = FrameBatch::zeros((frames.len(), h, w, c));
    for (i, frame) in frames.iter().enumerate() {
        if frame.patch.shape() != shape.as_slice() {
            return Err(PipelineError::PatchShape {
                expected: shape,
                actual: frame.patch.shape().to_vec(),
            });
        }
        stacked.index_axis_mut(Axis(0), i).assign(&frame.patch);
    }

    let n = frames.len();
    let mut motion = FrameBatch::zeros((n - 1, h, w, c));
    Zip::from(&mut motion)
        .and(&stacked.slice(s![1.., .., .., ..]))
        .and(&stacked.slice(s![..n - 1, .., .., ..]))
        .for_each(|m, &next, &prev| {
            let sum = next + prev;
            *m = if sum == 0.0 { 0.0 } else { (next - prev) / sum };
        });
    z_score_in_place(&mut motion);

    z_score_in_place(&mut stacked);

    debug!(frames = n, usable, "Built appearance/motion branches");

    Ok(Branches {
        appearance: stacked.slice(s![..usable, .., .., ..]).to_owned(),
        motion: motion.slice(s![..usable, .., .., ..]).to_owned(),
    })
}

/// Population z-score over every element; a constant batch becomes zeros
fn z_score_in_place(batch: &mut FrameBatch) {
    let count = batch.len();
    if count == 0 {
        return;
    }
    let mean = batch.iter().map(|&v| v as f64).sum::<f64>() / count as f64;
    let variance = batch
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / count as f64;
    let std_dev = variance.sqrt();

    if std_dev == 0.0 || !std_dev.is_finite() {
        batch.fill(0.0);
        return;
    }
    batch.mapv_inplace(|v| ((v as f64 - mean) / std_dev) as f32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_buffer::Patch;

    fn frames(values: &[f32]) -> Vec<Arc<FrameSample>> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                Arc::new(FrameSample {
                    patch: Patch::from_elem((2, 2, 3), v),
                    captured_at_ms: i as i64 * 33,
                })
            })
            .collect()
    }

    fn mean_std(batch: &FrameBatch) -> (f64, f64) {
        let n = batch.len() as f64;
        let mean = batch.iter().map(|&v| v as f64).sum::<f64>() / n;
        let var = batch.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / n;
        (mean, var.sqrt())
    }

    #[test]
    fn test_truncated_to_depth_multiple() {
        let values: Vec<f32> = (0..25).map(|i| 0.2 + 0.01 * i as f32).collect();
        let branches = build_branches(&frames(&values), 10).unwrap();
        // N - 1 = 24 -> 20
        assert_eq!(branches.len(), 20);
        assert_eq!(branches.motion.shape(), &[20, 2, 2, 3]);
        assert_eq!(branches.appearance.shape(), &[20, 2, 2, 3]);
    }

    #[test]
    fn test_exact_multiple_plus_one() {
        let values: Vec<f32> = (0..21).map(|i| 0.1 * (i % 3) as f32 + 0.1).collect();
        assert_eq!(build_branches(&frames(&values), 10).unwrap().len(), 20);
    }

    #[test]
    fn test_too_few_frames() {
        let err = build_branches(&frames(&[0.5; 10]), 10).unwrap_err();
        assert!(matches!(err, PipelineError::TooFewFrames { frames: 10, depth: 10 }));
    }

    #[test]
    fn test_no_frames() {
        assert!(matches!(build_branches(&[], 10), Err(PipelineError::NoFrames)));
    }

    #[test]
    fn test_appearance_normalized_before_truncation() {
        let values: Vec<f32> = (0..11).map(|i| i as f32 / 10.0).collect();
        let branches = build_branches(&frames(&values), 10).unwrap();
        // Window mean is 0.5; frame 5 sits on it
        assert!(branches.appearance[[5, 0, 0, 0]].abs() < 1e-5);
        assert!(branches.appearance[[0, 0, 0, 0]] < 0.0);
    }

    #[test]
    fn test_motion_is_z_scored() {
        let values: Vec<f32> = (0..31).map(|i| 0.3 + 0.1 * ((i as f32) * 0.7).sin()).collect();
        let branches = build_branches(&frames(&values), 10).unwrap();
        // All 30 differences survive truncation
        let (mean, std) = mean_std(&branches.motion);
        assert!(mean.abs() < 1e-4);
        assert!((std - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_sum_frames_give_zero_motion() {
        let branches = build_branches(&frames(&[0.0; 11]), 10).unwrap();
        assert!(branches.motion.iter().all(|&v| v == 0.0));
        assert!(branches.appearance.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_shape_mismatch() {
        let mut window = frames(&[0.5; 11]);
        window[4] = Arc::new(FrameSample {
            patch: Patch::zeros((3, 3, 3)),
            captured_at_ms: 200,
        });
        assert!(matches!(
            build_branches(&window, 10),
            Err(PipelineError::PatchShape { .. })
        ));
    }
}
