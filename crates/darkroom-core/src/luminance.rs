//! Luma calculation using ITU-R 601-2 coefficients.
//!
//! Grayscale conversion, the contrast midpoint and the saturation blend all
//! share this single definition so their results stay consistent.

// 16.16 fixed-point ITU-R 601-2 coefficients (0.299, 0.587, 0.114).
const FIXED_R: u32 = 19595;
const FIXED_G: u32 = 38470;
const FIXED_B: u32 = 7471;
const FIXED_HALF: u32 = 0x8000;

/// Calculate luma from u8 RGB values (0 to 255).
///
/// Uses 16.16 fixed point with round-half-up, so the result is exact and
/// reproducible across platforms.
///
/// # Example
/// ```
/// use darkroom_core::luminance::luma_u8;
///
/// assert_eq!(luma_u8(255, 0, 0), 76);
/// assert_eq!(luma_u8(255, 255, 255), 255);
/// ```
#[inline]
pub fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    let sum = FIXED_R * r as u32 + FIXED_G * g as u32 + FIXED_B * b as u32 + FIXED_HALF;
    (sum >> 16) as u8
}
