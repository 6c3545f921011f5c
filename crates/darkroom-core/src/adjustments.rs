//! Brightness, contrast and saturation enhancements.
//!
//! Each enhancement blends the image with a "degenerate" version of itself:
//!
//! ```text
//! out = clip(trunc(d + f * (v - d)))
//! ```
//!
//! where `f` is the enhancement factor (1.0 = unchanged) and `d` is
//! - 0 for brightness (blend toward black),
//! - the rounded mean luma of the whole image for contrast,
//! - the pixel's own luma for saturation.
//!
//! Factors below 1.0 move toward the degenerate image, factors above 1.0
//! extrapolate away from it.

use crate::luminance::luma_u8;

/// Slider value that leaves the image unchanged.
pub const NEUTRAL_PERCENT: f64 = 100.0;

/// Convert a percentage slider value (100 = unchanged) into a blend factor.
#[inline]
pub fn factor_from_percent(value: f64) -> f32 {
    (value / 100.0) as f32
}

/// Whether a percentage slider value leaves the image unchanged.
#[inline]
pub fn is_neutral(value: f64) -> bool {
    value == NEUTRAL_PERCENT
}

/// Blend a single channel value toward `degenerate`.
#[inline]
fn blend(degenerate: u8, value: u8, factor: f32) -> u8 {
    let d = degenerate as f32;
    let out = d + factor * (value as f32 - d);
    out.clamp(0.0, 255.0) as u8
}

/// Scale brightness of RGB pixel data in place.
///
/// # Arguments
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `factor` - 0.0 is black, 1.0 is unchanged, 2.0 doubles every channel
///
/// # Example
/// ```
/// use darkroom_core::adjustments::apply_brightness;
///
/// let mut pixels = vec![100, 50, 200];
/// apply_brightness(&mut pixels, 1.5);
/// assert_eq!(pixels, vec![150, 75, 255]);
/// ```
pub fn apply_brightness(pixels: &mut [u8], factor: f32) {
    if factor == 1.0 {
        return;
    }
    for v in pixels.iter_mut() {
        *v = blend(0, *v, factor);
    }
}

/// Scale contrast of RGB pixel data in place around the image's mean luma.
pub fn apply_contrast(pixels: &mut [u8], factor: f32) {
    if factor == 1.0 {
        return;
    }
    let mean = mean_luma(pixels);
    for v in pixels.iter_mut() {
        *v = blend(mean, *v, factor);
    }
}

/// Scale saturation of RGB pixel data in place.
///
/// Each pixel moves toward (or away from) its own gray value, so
/// `factor = 0.0` gives the same result as a grayscale conversion.
pub fn apply_saturation(pixels: &mut [u8], factor: f32) {
    if factor == 1.0 {
        return;
    }
    for chunk in pixels.chunks_exact_mut(3) {
        let l = luma_u8(chunk[0], chunk[1], chunk[2]);
        for v in chunk.iter_mut() {
            *v = blend(l, *v, factor);
        }
    }
}

/// Mean luma of RGB pixel data, rounded half up.
///
/// Returns 0 for empty data.
pub fn mean_luma(pixels: &[u8]) -> u8 {
    let mut sum: u64 = 0;
    let mut count: u64 = 0;
    for chunk in pixels.chunks_exact(3) {
        sum += luma_u8(chunk[0], chunk[1], chunk[2]) as u64;
        count += 1;
    }
    if count == 0 {
        return 0;
    }
    let mean = sum as f64 / count as f64;
    (mean + 0.5).floor().min(255.0) as u8
}
