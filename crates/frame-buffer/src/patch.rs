//! Patch preparation: crop → resize → scale to [0, 1]

use crate::PatchError;
use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::Array3;
use serde::{Deserialize, Serialize};

/// Default patch side length (pixels)
pub const DEFAULT_PATCH_DIM: u32 = 36;

/// Normalized face patch, shape `[dim, dim, 3]`
pub type Patch = Array3<f32>;

/// Pixel rectangle, right/bottom exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropBox {
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Largest square centered in a `width × height` frame
    pub fn max_center_square(width: u32, height: u32) -> Self {
        let side = width.min(height);
        let left = (width - side) / 2;
        let top = (height - side) / 2;
        Self::new(left, top, left + side, top + side)
    }

    /// Clamp a floating-point box to the frame
    pub fn from_rect_clamped(x: f32, y: f32, w: f32, h: f32, width: u32, height: u32) -> Self {
        let clamp = |v: f32, max: u32| v.max(0.0).min(max as f32) as u32;
        Self::new(
            clamp(x, width),
            clamp(y, height),
            clamp(x + w, width),
            clamp(y + h, height),
        )
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    fn validate(&self, frame: &RgbImage) -> Result<(), PatchError> {
        if self.is_empty() {
            return Err(PatchError::EmptyCrop(*self));
        }
        if self.right > frame.width() || self.bottom > frame.height() {
            return Err(PatchError::OutOfBounds {
                crop: *self,
                width: frame.width(),
                height: frame.height(),
            });
        }
        Ok(())
    }
}

/// Copy the cropped region of a frame
pub fn crop_rgb(frame: &RgbImage, crop: CropBox) -> Result<RgbImage, PatchError> {
    crop.validate(frame)?;
    Ok(imageops::crop_imm(frame, crop.left, crop.top, crop.width(), crop.height()).to_image())
}

/// Crop, resize to `dim × dim` and scale channels to `[0, 1]`
pub fn prepare_patch(frame: &RgbImage, crop: CropBox, dim: u32) -> Result<Patch, PatchError> {
    if dim == 0 {
        return Err(PatchError::ZeroDimension);
    }
    let face = crop_rgb(frame, crop)?;
    let resized = imageops::resize(&face, dim, dim, FilterType::Triangle);

    let side = dim as usize;
    Ok(Array3::from_shape_fn((side, side, 3), |(y, x, c)| {
        resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
    }))
}
