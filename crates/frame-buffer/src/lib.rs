//! Face Frame Buffer
//!
//! Holds the last `window_secs × capture_fps` face patches of a session:
//! - `FrameBuffer`: bounded FIFO ordered by capture time
//! - `prepare_patch`: crop, resize and scale a camera frame into a patch
//! - `FaceBoxStabilizer`: damps detector jitter in the face crop

mod buffer;
mod patch;
mod stabilize;

pub use buffer::{FrameBuffer, FrameSample, DEFAULT_CAPACITY};
pub use patch::{crop_rgb, prepare_patch, CropBox, Patch, DEFAULT_PATCH_DIM};
pub use stabilize::{FaceBoxStabilizer, DEFAULT_DELTA_RATE};

use thiserror::Error;

/// Patch preparation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("Crop {0:?} has no area")]
    EmptyCrop(CropBox),

    #[error("Crop {crop:?} exceeds {width}x{height} frame")]
    OutOfBounds {
        crop: CropBox,
        width: u32,
        height: u32,
    },

    #[error("Patch dimension must be positive")]
    ZeroDimension,
}
