//! Pixel-space cropping.
//!
//! Crop rectangles come straight from form fields, so they are signed and
//! validated against the bitmap before any pixels are touched.
//!
//! # Coordinate System
//!
//! - (0, 0) = top-left corner
//! - `x + width` and `y + height` may equal, but not exceed, the image size

use serde::{Deserialize, Serialize};

use crate::error::ImageError;
use crate::Bitmap;

/// A crop rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl CropRect {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check the rectangle against an image of `image_width` x `image_height`.
    ///
    /// # Errors
    ///
    /// `ImageError::Validation("Invalid crop parameters")` for negative
    /// offsets or non-positive sizes, and
    /// `ImageError::Validation("Crop area exceeds image dimensions")` when
    /// the rectangle extends past the right or bottom edge.
    pub fn validate(&self, image_width: u32, image_height: u32) -> Result<(), ImageError> {
        if self.x < 0 || self.y < 0 || self.width <= 0 || self.height <= 0 {
            return Err(ImageError::validation("Invalid crop parameters"));
        }
        let right = self.x.saturating_add(self.width);
        let bottom = self.y.saturating_add(self.height);
        if right > image_width as i64 || bottom > image_height as i64 {
            return Err(ImageError::validation("Crop area exceeds image dimensions"));
        }
        Ok(())
    }
}

/// Crop a bitmap to `rect`, keeping its color type.
///
/// # Example
///
/// ```
/// use darkroom_core::transform::{apply_crop, CropRect};
/// use image::{DynamicImage, RgbImage};
///
/// let image = DynamicImage::ImageRgb8(RgbImage::new(100, 100));
/// let cropped = apply_crop(&image, CropRect::new(25, 25, 50, 50)).unwrap();
/// assert_eq!((cropped.width(), cropped.height()), (50, 50));
/// ```
pub fn apply_crop(image: &Bitmap, rect: CropRect) -> Result<Bitmap, ImageError> {
    rect.validate(image.width(), image.height())?;

    // Fast path: full crop returns a clone
    if rect.x == 0
        && rect.y == 0
        && rect.width == image.width() as i64
        && rect.height == image.height() as i64
    {
        return Ok(image.clone());
    }

    Ok(image.crop_imm(
        rect.x as u32,
        rect.y as u32,
        rect.width as u32,
        rect.height as u32,
    ))
}
