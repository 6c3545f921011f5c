//! Mutually exclusive look filters: grayscale, sepia, blur and invert.
//!
//! All filters operate on 8-bit RGB data. Callers normalize the bitmap with
//! [`to_rgb`] first.

use image::RgbImage;

use crate::luminance::luma_u8;
use crate::Bitmap;

/// Sepia tone matrix, one row per output channel (R, G, B).
pub const SEPIA_MATRIX: [[f64; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// 5x5 blur kernel: a ring of ones around a zero interior.
const BLUR_KERNEL: [[u32; 5]; 5] = [
    [1, 1, 1, 1, 1],
    [1, 0, 0, 0, 1],
    [1, 0, 0, 0, 1],
    [1, 0, 0, 0, 1],
    [1, 1, 1, 1, 1],
];
const BLUR_DIVISOR: u32 = 16;
const BLUR_SIZE: u32 = 5;
const BLUR_RADIUS: u32 = BLUR_SIZE / 2;

/// Normalize any bitmap to 8-bit RGB. Alpha is discarded.
pub fn to_rgb(image: &Bitmap) -> RgbImage {
    image.to_rgb8()
}

/// Replace every pixel with its luma, replicated to all three channels.
pub fn grayscale(pixels: &mut [u8]) {
    for chunk in pixels.chunks_exact_mut(3) {
        let l = luma_u8(chunk[0], chunk[1], chunk[2]);
        chunk[0] = l;
        chunk[1] = l;
        chunk[2] = l;
    }
}

/// Apply [`SEPIA_MATRIX`] to every pixel.
///
/// Each output channel is clipped to [0, 255] and truncated.
pub fn sepia(pixels: &mut [u8]) {
    for chunk in pixels.chunks_exact_mut(3) {
        let (r, g, b) = (chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
        for (out, row) in chunk.iter_mut().zip(SEPIA_MATRIX.iter()) {
            let v = row[0] * r + row[1] * g + row[2] * b;
            *out = v.clamp(0.0, 255.0) as u8;
        }
    }
}

/// Replace every channel value `v` with `255 - v`.
pub fn invert(pixels: &mut [u8]) {
    for v in pixels.iter_mut() {
        *v = 255 - *v;
    }
}

/// Blur with the fixed 5x5 ring kernel.
///
/// Only pixels with the whole kernel inside the image are filtered. The
/// two-pixel border is copied through unchanged, and an image smaller than
/// the kernel is returned as-is. Results are rounded to the nearest integer.
pub fn blur(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut out = image.clone();
    if width < BLUR_SIZE || height < BLUR_SIZE {
        return out;
    }

    let half = BLUR_DIVISOR / 2;
    for y in BLUR_RADIUS..height - BLUR_RADIUS {
        for x in BLUR_RADIUS..width - BLUR_RADIUS {
            let mut acc = [0u32; 3];
            for (ky, row) in BLUR_KERNEL.iter().enumerate() {
                let sy = y + ky as u32 - BLUR_RADIUS;
                for (kx, &weight) in row.iter().enumerate() {
                    if weight == 0 {
                        continue;
                    }
                    let p = image.get_pixel(x + kx as u32 - BLUR_RADIUS, sy).0;
                    acc[0] += weight * p[0] as u32;
                    acc[1] += weight * p[1] as u32;
                    acc[2] += weight * p[2] as u32;
                }
            }
            out.put_pixel(
                x,
                y,
                image::Rgb([
                    ((acc[0] + half) / BLUR_DIVISOR) as u8,
                    ((acc[1] + half) / BLUR_DIVISOR) as u8,
                    ((acc[2] + half) / BLUR_DIVISOR) as u8,
                ]),
            );
        }
    }
    out
}
