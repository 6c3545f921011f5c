//! Image resizing with optional aspect-ratio preservation.
//!
//! All functions return new bitmaps without modifying the input.

use image::imageops::FilterType;

use crate::error::ImageError;
use crate::Bitmap;

/// Largest accepted output side.
pub const MAX_DIMENSION: u32 = 16_384;

/// Largest accepted output area, in pixels.
pub const MAX_PIXELS: u64 = 64 * 1024 * 1024;

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `ImageError::Validation` if either target dimension is zero or
/// the output would exceed [`MAX_DIMENSION`] or [`MAX_PIXELS`].
pub fn resize_exact(
    image: &Bitmap,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<Bitmap, ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::validation(format!(
            "Resize target must be at least 1x1, got {width}x{height}"
        )));
    }
    check_bounds(width, height)?;

    // Fast path: if dimensions match, just clone
    if image.width() == width && image.height() == height {
        return Ok(image.clone());
    }

    Ok(image.resize_exact(width, height, filter))
}

/// Resize with Lanczos3 to `width` and/or `height`.
///
/// - Both given: exact resize, aspect ratio not preserved.
/// - One given: the other side is scaled by the same ratio and truncated.
/// - Neither given: the image is returned unchanged.
///
/// # Errors
///
/// Returns `ImageError::Validation` when a requested or derived dimension
/// is zero or too large.
pub fn apply_resize(
    image: &Bitmap,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<Bitmap, ImageError> {
    match target_dimensions(image.width(), image.height(), width, height)? {
        Some((w, h)) => resize_exact(image, w, h, FilterType::Lanczos3),
        None => Ok(image.clone()),
    }
}

/// Work out the output size for [`apply_resize`].
///
/// Returns `Ok(None)` when no target was requested. A derived side larger
/// than [`MAX_DIMENSION`] is a validation error.
pub fn target_dimensions(
    src_width: u32,
    src_height: u32,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<Option<(u32, u32)>, ImageError> {
    let dims = match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, scaled_side(src_height, w, src_width)?),
        (None, Some(h)) => (scaled_side(src_width, h, src_height)?, h),
        (None, None) => return Ok(None),
    };
    check_bounds(dims.0, dims.1)?;
    Ok(Some(dims))
}

/// `side * (target / reference)`, truncated.
fn scaled_side(side: u32, target: u32, reference: u32) -> Result<u32, ImageError> {
    let ratio = target as f64 / reference as f64;
    let scaled = (side as f64 * ratio).trunc();
    if !scaled.is_finite() || scaled > MAX_DIMENSION as f64 {
        return Err(ImageError::validation(format!(
            "Resize target exceeds {MAX_DIMENSION} pixels per side"
        )));
    }
    Ok(scaled as u32)
}

fn check_bounds(width: u32, height: u32) -> Result<(), ImageError> {
    // u32 * u32 always fits in u64
    let area = width as u64 * height as u64;
    if width > MAX_DIMENSION || height > MAX_DIMENSION || area > MAX_PIXELS {
        return Err(ImageError::validation(format!(
            "Resize target {width}x{height} is too large"
        )));
    }
    Ok(())
}
