//! Histogram computation from RGB pixel data.
//!
//! Feeds the histogram endpoint and the equalize/stretch adjustments.

use crate::luminance::luma_u8;
use crate::{Bitmap, Histogram};

/// Compute RGB and luminance histograms from pixel data.
///
/// # Arguments
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Returns
/// A `Histogram` with all four channels (red, green, blue, luminance) populated.
///
/// # Example
/// ```
/// use darkroom_core::histogram::compute_histogram;
///
/// let pixels = vec![255, 0, 0, 0, 255, 0]; // Red, Green pixels
/// let hist = compute_histogram(&pixels, 2, 1);
/// assert_eq!(hist.red[255], 1);
/// assert_eq!(hist.green[255], 1);
/// ```
pub fn compute_histogram(pixels: &[u8], width: u32, height: u32) -> Histogram {
    let mut hist = Histogram::new();

    let expected_len = (width as usize) * (height as usize) * 3;

    // Early return for empty or invalid data
    if pixels.is_empty() || expected_len == 0 {
        return hist;
    }

    debug_assert!(
        pixels.len() == expected_len,
        "Pixel data size mismatch. Expected {}, got {}",
        expected_len,
        pixels.len()
    );

    for chunk in pixels.chunks_exact(3) {
        hist.red[chunk[0] as usize] += 1;
        hist.green[chunk[1] as usize] += 1;
        hist.blue[chunk[2] as usize] += 1;
        hist.luminance[luma_u8(chunk[0], chunk[1], chunk[2]) as usize] += 1;
    }

    hist
}

/// Histogram of any bitmap, taken over its 8-bit RGB representation.
pub fn histogram_of(image: &Bitmap) -> Histogram {
    let rgb = image.to_rgb8();
    compute_histogram(rgb.as_raw(), rgb.width(), rgb.height())
}
