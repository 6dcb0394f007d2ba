//! Yaw estimation from face-mesh landmarks

use crate::LandmarkError;
use serde::{Deserialize, Serialize};

/// Face-mesh point (image coordinates)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Yaw (degrees) of the eye-center → nose-tip vector.
///
/// A frontal face in image coordinates (y down) gives 90°.
pub fn yaw_from_landmarks(right_eye_outer: Landmark, left_eye_outer: Landmark, nose_tip: Landmark) -> f64 {
    let center_x = (right_eye_outer.x + left_eye_outer.x) / 2.0;
    let center_y = (right_eye_outer.y + left_eye_outer.y) / 2.0;
    (nose_tip.y - center_y).atan2(nose_tip.x - center_x).to_degrees()
}

/// 468/478-point face mesh
#[derive(Debug, Clone, Default)]
pub struct FaceMesh {
    points: Vec<Landmark>,
}

impl FaceMesh {
    pub const NOSE_TIP: usize = 1;
    pub const RIGHT_EYE_OUTER: usize = 33;
    pub const LEFT_EYE_OUTER: usize = 263;

    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    /// Yaw from the outer eye corners and the nose tip
    pub fn yaw(&self) -> Result<f64, LandmarkError> {
        let required = Self::LEFT_EYE_OUTER + 1;
        if self.points.len() < required {
            return Err(LandmarkError::TooFewLandmarks {
                required,
                actual: self.points.len(),
            });
        }

        let pick = |index: usize| {
            let p = self.points[index];
            if p.x.is_finite() && p.y.is_finite() {
                Ok(p)
            } else {
                Err(LandmarkError::NonFinite(index))
            }
        };

        Ok(yaw_from_landmarks(
            pick(Self::RIGHT_EYE_OUTER)?,
            pick(Self::LEFT_EYE_OUTER)?,
            pick(Self::NOSE_TIP)?,
        ))
    }
}
