//! Clockwise image rotation with canvas expansion.
//!
//! Quarter turns are lossless and keep the bitmap's color type. Any other
//! angle is rendered into an RGBA canvas sized to the rotated bounding box,
//! with uncovered corners left transparent.
//!
//! # Algorithm
//!
//! Arbitrary angles use inverse mapping: for each output pixel center we
//! find the source location it came from and sample there.
//!
//! For a clockwise rotation by θ (y axis pointing down):
//! ```text
//! src_x =  dx * cos(θ) + dy * sin(θ) + src_cx
//! src_y = -dx * sin(θ) + dy * cos(θ) + src_cy
//! ```
//! where `(dx, dy)` is the output pixel center relative to the output center.

use image::{DynamicImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::Bitmap;

/// Angles closer than this to a quarter turn take the lossless path.
const ANGLE_EPSILON: f64 = 0.001;

/// Fill used for canvas area not covered by the rotated image.
pub const TRANSPARENT: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// Sampling method for non-quarter-turn rotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Nearest source pixel. Keeps hard edges.
    #[default]
    Nearest,
    /// Weighted average of the 4 surrounding pixels.
    Bilinear,
}

impl Interpolation {
    /// Parse a case-insensitive name: `nearest` or `bilinear`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "nearest" => Some(Self::Nearest),
            "bilinear" => Some(Self::Bilinear),
            _ => None,
        }
    }
}

/// Normalize an angle to the half-open range [0, 360).
fn normalize_degrees(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    if (360.0 - d).abs() < ANGLE_EPSILON {
        0.0
    } else {
        d
    }
}

/// Number of clockwise quarter turns if `degrees` is (nearly) a multiple of 90.
fn quarter_turns(degrees: f64) -> Option<u8> {
    let d = normalize_degrees(degrees);
    let turns = (d / 90.0).round();
    if (d - turns * 90.0).abs() < ANGLE_EPSILON {
        Some((turns as u8) % 4)
    } else {
        None
    }
}

/// Compute the dimensions of the bounding box for a rotated image.
///
/// # Example
///
/// ```
/// use darkroom_core::transform::compute_rotated_bounds;
///
/// // 90-degree rotation swaps dimensions
/// assert_eq!(compute_rotated_bounds(100, 50, 90.0), (50, 100));
///
/// // No rotation preserves dimensions
/// assert_eq!(compute_rotated_bounds(100, 50, 0.0), (100, 50));
/// ```
pub fn compute_rotated_bounds(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    match quarter_turns(degrees) {
        Some(0) | Some(2) => return (width, height),
        Some(_) => return (height, width),
        None => {}
    }

    let rad = degrees.to_radians();
    let cos = rad.cos().abs();
    let sin = rad.sin().abs();
    let (w, h) = (width as f64, height as f64);

    // Round up so no covered pixel is clipped; the small bias absorbs
    // floating point noise on exact values.
    let new_w = (w * cos + h * sin - 1e-6).ceil() as u32;
    let new_h = (w * sin + h * cos - 1e-6).ceil() as u32;

    (new_w.max(1), new_h.max(1))
}

/// Rotate `image` clockwise by `degrees`, expanding the canvas to fit.
///
/// Negative angles rotate counter-clockwise.
pub fn apply_rotation(image: &Bitmap, degrees: f64, interpolation: Interpolation) -> Bitmap {
    match quarter_turns(degrees) {
        Some(0) => return image.clone(),
        Some(1) => return image.rotate90(),
        Some(2) => return image.rotate180(),
        Some(3) => return image.rotate270(),
        _ => {}
    }

    let src = image.to_rgba8();
    let (src_w, src_h) = src.dimensions();
    let (dst_w, dst_h) = compute_rotated_bounds(src_w, src_h, degrees);

    let rad = degrees.to_radians();
    let (sin, cos) = rad.sin_cos();

    let src_cx = src_w as f64 / 2.0;
    let src_cy = src_h as f64 / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    let output = RgbaImage::from_fn(dst_w, dst_h, |dst_x, dst_y| {
        // Pixel centers, relative to the canvas center
        let dx = dst_x as f64 + 0.5 - dst_cx;
        let dy = dst_y as f64 + 0.5 - dst_cy;

        let src_x = dx * cos + dy * sin + src_cx;
        let src_y = -dx * sin + dy * cos + src_cy;

        match interpolation {
            Interpolation::Nearest => sample_nearest(&src, src_x, src_y),
            Interpolation::Bilinear => sample_bilinear(&src, src_x - 0.5, src_y - 0.5),
        }
    });

    DynamicImage::ImageRgba8(output)
}

/// Sample the pixel containing continuous coordinate `(x, y)`.
fn sample_nearest(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (w, h) = image.dimensions();
    if x < 0.0 || y < 0.0 || x >= w as f64 || y >= h as f64 {
        return TRANSPARENT;
    }
    *image.get_pixel(x as u32, y as u32)
}

/// Fetch a pixel, treating anything outside the image as [`TRANSPARENT`].
#[inline]
fn pixel_or_fill(image: &RgbaImage, x: i64, y: i64) -> [f64; 4] {
    let (w, h) = image.dimensions();
    let p = if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
        TRANSPARENT
    } else {
        *image.get_pixel(x as u32, y as u32)
    };
    [p[0] as f64, p[1] as f64, p[2] as f64, p[3] as f64]
}

/// Sample using bilinear interpolation, with `(x, y)` in pixel-index space.
fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (w, h) = image.dimensions();

    // Entirely outside, including the half-pixel border
    if x <= -1.0 || y <= -1.0 || x >= w as f64 || y >= h as f64 {
        return TRANSPARENT;
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = pixel_or_fill(image, x0, y0);
    let p10 = pixel_or_fill(image, x0 + 1, y0);
    let p01 = pixel_or_fill(image, x0, y0 + 1);
    let p11 = pixel_or_fill(image, x0 + 1, y0 + 1);

    let mut result = [0u8; 4];
    for i in 0..4 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    Rgba(result)
}
