//! Face box stabilization
//!
//! Detector boxes jitter by a few pixels from frame to frame, which shows up
//! as noise in the patch colour trace. The stabilizer keeps a box padded by
//! `delta_rate` around the face and only moves it when the detected face
//! crosses one of its edges.

use crate::CropBox;
use tracing::trace;

/// Default padding ratio around the detected face
pub const DEFAULT_DELTA_RATE: f64 = 0.20;

/// Signed box; the stable box may drift past the frame before clamping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edges {
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
}

#[derive(Debug, Clone)]
pub struct FaceBoxStabilizer {
    delta_rate: f64,
    stable: Option<Edges>,
}

impl FaceBoxStabilizer {
    pub fn new(delta_rate: f64) -> Self {
        Self {
            delta_rate: delta_rate.max(0.0),
            stable: None,
        }
    }

    /// Feed a detected face box, get the crop to use for this frame.
    ///
    /// The first box after construction or [`reset`](Self::reset) is padded
    /// by `delta_rate / 2` on each side. Later boxes only move the stable box
    /// when they leave it; the moved box is `1 + delta_rate` times the face.
    pub fn update(&mut self, face: CropBox, width: u32, height: u32) -> CropBox {
        let (left, top) = (face.left as i64, face.top as i64);
        let (right, bottom) = (face.right as i64, face.bottom as i64);
        let face_w = face.width() as f64;
        let face_h = face.height() as f64;

        let next = match self.stable {
            None => {
                let pad_w = (face_w * self.delta_rate / 2.0).round() as i64;
                let pad_h = (face_h * self.delta_rate / 2.0).round() as i64;
                Edges {
                    left: (left - pad_w).max(0),
                    top: (top - pad_h).max(0),
                    right: (right + pad_w).min(width as i64),
                    bottom: (bottom + pad_h).min(height as i64),
                }
            }
            Some(mut s) => {
                let span_w = (face_w * (1.0 + self.delta_rate)).round() as i64;
                let span_h = (face_h * (1.0 + self.delta_rate)).round() as i64;
                if left < s.left {
                    s.left = left;
                    s.right = left + span_w;
                } else if right > s.right {
                    s.right = right;
                    s.left = right - span_w;
                }
                if top < s.top {
                    s.top = top;
                    s.bottom = top + span_h;
                } else if bottom > s.bottom {
                    s.bottom = bottom;
                    s.top = bottom - span_h;
                }
                s
            }
        };

        if self.stable != Some(next) {
            trace!(?face, ?next, "Stable face box moved");
        }
        self.stable = Some(next);
        clamp(next, width, height)
    }

    /// Forget the stable box; the next face starts fresh
    pub fn reset(&mut self) {
        self.stable = None;
    }

    pub fn is_tracking(&self) -> bool {
        self.stable.is_some()
    }
}

impl Default for FaceBoxStabilizer {
    fn default() -> Self {
        Self::new(DEFAULT_DELTA_RATE)
    }
}

fn clamp(edges: Edges, width: u32, height: u32) -> CropBox {
    let fit = |v: i64, max: u32| v.clamp(0, max as i64) as u32;
    CropBox::new(
        fit(edges.left, width),
        fit(edges.top, height),
        fit(edges.right, width),
        fit(edges.bottom, height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: u32 = 640;
    const H: u32 = 480;

    #[test]
    fn test_first_box_is_padded() {
        let mut stabilizer = FaceBoxStabilizer::default();
        let crop = stabilizer.update(CropBox::new(100, 100, 200, 220), W, H);
        assert_eq!(crop, CropBox::new(90, 88, 210, 232));
        assert!(stabilizer.is_tracking());
    }

    #[test]
    fn test_first_box_clamped_to_frame() {
        let mut stabilizer = FaceBoxStabilizer::default();
        let crop = stabilizer.update(CropBox::new(570, 410, 638, 479), W, H);
        assert_eq!(crop, CropBox::new(563, 403, 640, 480));

        let crop = stabilizer.update(CropBox::new(10, 5, 110, 125), W, H);
        assert_eq!(crop, CropBox::new(10, 5, 130, 149));
    }

    #[test]
    fn test_small_shift_keeps_crop() {
        let mut stabilizer = FaceBoxStabilizer::default();
        let first = stabilizer.update(CropBox::new(100, 100, 200, 220), W, H);
        for face in [
            CropBox::new(105, 95, 205, 215),
            CropBox::new(94, 90, 194, 210),
            CropBox::new(108, 110, 208, 230),
        ] {
            assert_eq!(stabilizer.update(face, W, H), first);
        }
    }

    #[test]
    fn test_shift_past_edge_moves_crop() {
        let mut stabilizer = FaceBoxStabilizer::default();
        stabilizer.update(CropBox::new(100, 100, 200, 220), W, H);

        let crop = stabilizer.update(CropBox::new(220, 100, 320, 220), W, H);
        assert_eq!(crop, CropBox::new(200, 88, 320, 232));

        let crop = stabilizer.update(CropBox::new(220, 60, 320, 180), W, H);
        assert_eq!(crop, CropBox::new(200, 60, 320, 204));
    }

    #[test]
    fn test_moved_box_clamped_to_frame() {
        let mut stabilizer = FaceBoxStabilizer::default();
        stabilizer.update(CropBox::new(20, 20, 120, 140), W, H);
        let crop = stabilizer.update(CropBox::new(0, 0, 100, 120), W, H);
        assert_eq!(crop, CropBox::new(0, 0, 120, 144));

        // Taller face pushes the top above the frame
        let crop = stabilizer.update(CropBox::new(0, 0, 100, 200), W, H);
        assert_eq!(crop, CropBox::new(0, 0, 120, 200));

        let mut stabilizer = FaceBoxStabilizer::default();
        assert_eq!(
            stabilizer.update(CropBox::new(540, 340, 620, 440), W, H),
            CropBox::new(532, 330, 628, 450)
        );
        let crop = stabilizer.update(CropBox::new(500, 340, 640, 460), W, H);
        assert_eq!(crop, CropBox::new(500, 316, 640, 460));
    }

    #[test]
    fn test_reset_pads_next_box() {
        let mut stabilizer = FaceBoxStabilizer::default();
        stabilizer.update(CropBox::new(100, 100, 200, 220), W, H);
        stabilizer.reset();
        assert!(!stabilizer.is_tracking());

        let crop = stabilizer.update(CropBox::new(300, 200, 400, 320), W, H);
        assert_eq!(crop, CropBox::new(290, 188, 410, 332));
    }
}
