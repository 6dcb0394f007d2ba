//! Oracle input/output types

use frame_buffer::CropBox;
use ndarray::Array4;
use serde::{Deserialize, Serialize};

/// Stacked patches, shape `[frames, dim, dim, 3]`
pub type FrameBatch = Array4<f32>;

/// Face bounding box in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
}

impl BoundingBox {
    /// Crop rectangle clamped to a `frame_width × frame_height` frame
    pub fn to_crop(&self, frame_width: u32, frame_height: u32) -> CropBox {
        CropBox::from_rect_clamped(
            self.x,
            self.y,
            self.width,
            self.height,
            frame_width,
            frame_height,
        )
    }
}

/// Landmark model output for one face crop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkEstimate {
    pub yaw_degrees: f64,
    pub face_present: bool,
}

/// vPPG model trained for a capture rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelVariant {
    Fps30,
    Fps24,
    Fps16,
}

impl ModelVariant {
    /// Pick the model closest to the measured capture rate
    pub fn for_fps(fps: u32) -> Self {
        if fps >= 28 {
            ModelVariant::Fps30
        } else if fps >= 20 {
            ModelVariant::Fps24
        } else {
            ModelVariant::Fps16
        }
    }

    /// Model file stem
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelVariant::Fps30 => "vppg_30fps",
            ModelVariant::Fps24 => "vppg_24fps",
            ModelVariant::Fps16 => "vppg_16fps",
        }
    }
}
