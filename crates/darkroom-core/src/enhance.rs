//! Extended adjustments: histogram equalize/stretch, thresholding, blur
//! variants and edge detection.
//!
//! Tone operations (equalize, stretch) keep RGB output. Threshold and edge
//! detection work on luma and return single-channel bitmaps.

use image::{DynamicImage, GrayImage, Luma, RgbImage};
use imageproc::contrast::otsu_level;
use imageproc::edges::canny;
use imageproc::filter::{gaussian_blur_f32, median_filter};
use imageproc::gradients::sobel_gradients;

use crate::error::ImageError;
use crate::filters;
use crate::histogram::compute_histogram;
use crate::luminance::luma_u8;
use crate::Bitmap;

/// Default Gaussian sigma when none is supplied.
pub const DEFAULT_SIGMA: f32 = 2.0;
/// Default median window radius when none is supplied.
pub const DEFAULT_MEDIAN_RADIUS: u32 = 2;
/// Largest accepted median window radius.
pub const MAX_MEDIAN_RADIUS: u32 = 25;
/// Default Canny hysteresis thresholds.
pub const DEFAULT_CANNY_LOW: f32 = 50.0;
pub const DEFAULT_CANNY_HIGH: f32 = 100.0;

/// A 256-entry lookup table for one channel.
type Lut = [u8; 256];

fn identity_lut() -> Lut {
    let mut lut = [0u8; 256];
    for (i, v) in lut.iter_mut().enumerate() {
        *v = i as u8;
    }
    lut
}

fn apply_luts(image: &mut RgbImage, luts: &[Lut; 3]) {
    for px in image.pixels_mut() {
        for (c, lut) in luts.iter().enumerate() {
            px.0[c] = lut[px.0[c] as usize];
        }
    }
}

/// Per-channel 8-bit luma of a bitmap.
pub fn luma_image(image: &Bitmap) -> GrayImage {
    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let p = rgb.get_pixel(x, y).0;
        Luma([luma_u8(p[0], p[1], p[2])])
    })
}

// ===== Histogram equalization =====

fn equalize_lut(bins: &[u32; 256]) -> Lut {
    let total: u64 = bins.iter().map(|&b| b as u64).sum();
    let cdf_min = bins.iter().find(|&&b| b > 0).copied().unwrap_or(0) as u64;
    if total == 0 || total == cdf_min {
        // Single-valued channel, nothing to spread
        return identity_lut();
    }

    let mut lut = [0u8; 256];
    let mut cdf: u64 = 0;
    let span = (total - cdf_min) as f64;
    for (i, &count) in bins.iter().enumerate() {
        cdf += count as u64;
        let scaled = (cdf.saturating_sub(cdf_min)) as f64 / span * 255.0;
        lut[i] = scaled.round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Equalize each RGB channel independently using its cumulative histogram.
pub fn equalize_histogram(image: &Bitmap) -> Bitmap {
    let mut rgb = filters::to_rgb(image);
    let hist = compute_histogram(rgb.as_raw(), rgb.width(), rgb.height());
    let luts = [
        equalize_lut(&hist.red),
        equalize_lut(&hist.green),
        equalize_lut(&hist.blue),
    ];
    apply_luts(&mut rgb, &luts);
    DynamicImage::ImageRgb8(rgb)
}

// ===== Histogram stretch =====

/// Smallest value whose cumulative count reaches `fraction` of the total.
fn percentile(bins: &[u32; 256], fraction: f64) -> u8 {
    let total: u64 = bins.iter().map(|&b| b as u64).sum();
    let target = (fraction * total as f64).ceil().max(1.0) as u64;
    let mut cdf: u64 = 0;
    for (i, &count) in bins.iter().enumerate() {
        cdf += count as u64;
        if cdf >= target {
            return i as u8;
        }
    }
    255
}

fn stretch_lut(bins: &[u32; 256], low_fraction: f64, high_fraction: f64) -> Lut {
    let low = percentile(bins, low_fraction) as f64;
    let high = percentile(bins, high_fraction) as f64;
    if high <= low {
        return identity_lut();
    }

    let mut lut = [0u8; 256];
    for (i, v) in lut.iter_mut().enumerate() {
        let scaled = (i as f64 - low) * 255.0 / (high - low);
        *v = scaled.round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Linearly stretch each RGB channel so the `low_percent` percentile maps to
/// 0 and the `high_percent` percentile maps to 255.
///
/// # Errors
///
/// Returns `ImageError::Validation` unless `0 <= low < high <= 100`.
pub fn stretch_histogram(
    image: &Bitmap,
    low_percent: f64,
    high_percent: f64,
) -> Result<Bitmap, ImageError> {
    if !(0.0..=100.0).contains(&low_percent)
        || !(0.0..=100.0).contains(&high_percent)
        || low_percent >= high_percent
    {
        return Err(ImageError::validation(
            "Percentiles must satisfy 0 <= low < high <= 100",
        ));
    }

    let mut rgb = filters::to_rgb(image);
    let hist = compute_histogram(rgb.as_raw(), rgb.width(), rgb.height());
    let (lo, hi) = (low_percent / 100.0, high_percent / 100.0);
    let luts = [
        stretch_lut(&hist.red, lo, hi),
        stretch_lut(&hist.green, lo, hi),
        stretch_lut(&hist.blue, lo, hi),
    ];
    apply_luts(&mut rgb, &luts);
    Ok(DynamicImage::ImageRgb8(rgb))
}

// ===== Threshold =====

/// Binary threshold on luma: values above `level` become 255, others 0.
///
/// Without an explicit level, Otsu's method picks one.
pub fn threshold(image: &Bitmap, level: Option<u8>) -> Bitmap {
    let mut gray = luma_image(image);
    let level = level.unwrap_or_else(|| otsu_level(&gray));
    for px in gray.pixels_mut() {
        px.0[0] = if px.0[0] > level { 255 } else { 0 };
    }
    DynamicImage::ImageLuma8(gray)
}

// ===== Blur variants =====

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlurKind {
    /// The fixed 5x5 ring kernel used by the `blur` look filter.
    Box,
    /// Gaussian blur with standard deviation `sigma` (must be > 0).
    Gaussian { sigma: f32 },
    /// Median filter over a `(2r+1) x (2r+1)` window.
    Median { radius: u32 },
}

impl BlurKind {
    /// Build a blur kind from its name plus optional parameters.
    pub fn parse(name: &str, sigma: Option<f32>, radius: Option<u32>) -> Result<Self, ImageError> {
        match name {
            "box" => Ok(Self::Box),
            "gaussian" => {
                let sigma = sigma.unwrap_or(DEFAULT_SIGMA);
                if !sigma.is_finite() || sigma <= 0.0 {
                    return Err(ImageError::validation("Sigma must be greater than 0"));
                }
                Ok(Self::Gaussian { sigma })
            }
            "median" => {
                let radius = radius.unwrap_or(DEFAULT_MEDIAN_RADIUS);
                if radius == 0 || radius > MAX_MEDIAN_RADIUS {
                    return Err(ImageError::validation(format!(
                        "Radius must be between 1 and {MAX_MEDIAN_RADIUS}"
                    )));
                }
                Ok(Self::Median { radius })
            }
            other => Err(ImageError::unsupported(format!("Unknown blur type: {other}"))),
        }
    }
}

/// Blur an image with the selected kernel. Output is RGB.
pub fn blur_variant(image: &Bitmap, kind: BlurKind) -> Bitmap {
    let rgb = filters::to_rgb(image);
    let out = match kind {
        BlurKind::Box => filters::blur(&rgb),
        BlurKind::Gaussian { sigma } => gaussian_blur_f32(&rgb, sigma),
        BlurKind::Median { radius } => median_filter(&rgb, radius, radius),
    };
    DynamicImage::ImageRgb8(out)
}

// ===== Edge detection =====

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeKind {
    /// Canny with hysteresis thresholds.
    Canny { low: f32, high: f32 },
    /// Sobel gradient magnitude.
    Sobel,
}

impl EdgeKind {
    pub fn parse(name: &str, low: Option<f32>, high: Option<f32>) -> Result<Self, ImageError> {
        match name {
            "canny" => {
                let low = low.unwrap_or(DEFAULT_CANNY_LOW);
                let high = high.unwrap_or(DEFAULT_CANNY_HIGH);
                if !low.is_finite() || !high.is_finite() || low < 0.0 || high < low {
                    return Err(ImageError::validation(
                        "Canny thresholds must satisfy 0 <= low <= high",
                    ));
                }
                Ok(Self::Canny { low, high })
            }
            "sobel" => Ok(Self::Sobel),
            other => Err(ImageError::unsupported(format!("Unknown edge method: {other}"))),
        }
    }
}

/// Detect edges on the luma channel. Output is single-channel.
pub fn detect_edges(image: &Bitmap, kind: EdgeKind) -> Bitmap {
    let gray = luma_image(image);
    let edges = match kind {
        EdgeKind::Canny { low, high } => canny(&gray, low, high),
        EdgeKind::Sobel => {
            let gradients = sobel_gradients(&gray);
            GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
                Luma([gradients.get_pixel(x, y).0[0].min(255) as u8])
            })
        }
    };
    DynamicImage::ImageLuma8(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// Left half dark, right half bright.
    fn split_image(width: u32, height: u32, dark: u8, bright: u8) -> Bitmap {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, _| {
            let v = if x < width / 2 { dark } else { bright };
            Rgb([v, v, v])
        }))
    }

    // ===== Equalize =====

    #[test]
    fn test_equalize_two_levels_spreads_to_full_range() {
        let out = equalize_histogram(&split_image(10, 4, 100, 120)).to_rgb8();
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(out.get_pixel(9, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_equalize_uniform_image_unchanged() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 5, Rgb([40, 80, 120])));
        assert_eq!(equalize_histogram(&img).to_rgb8(), img.to_rgb8());
    }

    #[test]
    fn test_equalize_lut_is_monotonic() {
        let mut bins = [0u32; 256];
        bins[10] = 5;
        bins[50] = 1;
        bins[200] = 30;
        let lut = equalize_lut(&bins);
        assert!(lut.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(lut[200], 255);
    }

    // ===== Stretch =====

    #[test]
    fn test_stretch_full_range_maps_extremes() {
        let out = stretch_histogram(&split_image(10, 2, 60, 180), 0.0, 100.0)
            .unwrap()
            .to_rgb8();
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
        assert_eq!(out.get_pixel(9, 0).0[0], 255);
    }

    #[test]
    fn test_stretch_rejects_bad_percentiles() {
        let img = split_image(4, 4, 0, 255);
        assert!(stretch_histogram(&img, 50.0, 50.0).is_err());
        assert!(stretch_histogram(&img, -1.0, 99.0).is_err());
        assert!(stretch_histogram(&img, 1.0, 101.0).is_err());
    }

    #[test]
    fn test_percentile() {
        let mut bins = [0u32; 256];
        bins[10] = 50;
        bins[20] = 50;
        assert_eq!(percentile(&bins, 0.0), 10);
        assert_eq!(percentile(&bins, 0.5), 10);
        assert_eq!(percentile(&bins, 0.51), 20);
        assert_eq!(percentile(&bins, 1.0), 20);
    }

    // ===== Threshold =====

    #[test]
    fn test_threshold_explicit_level() {
        let out = threshold(&split_image(4, 1, 100, 101), Some(100)).to_luma8();
        assert_eq!(out.get_pixel(0, 0).0, [0]);
        assert_eq!(out.get_pixel(3, 0).0, [255]);
    }

    #[test]
    fn test_threshold_otsu_separates_two_levels() {
        let out = threshold(&split_image(10, 10, 30, 220), None).to_luma8();
        assert_eq!(out.get_pixel(0, 5).0, [0]);
        assert_eq!(out.get_pixel(9, 5).0, [255]);
    }

    #[test]
    fn test_threshold_output_is_binary() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(16, 16, |x, y| {
            Rgb([(x * 16) as u8, (y * 16) as u8, 77])
        }));
        let out = threshold(&img, None).to_luma8();
        assert!(out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    // ===== Blur =====

    #[test]
    fn test_blur_kind_parse() {
        assert_eq!(BlurKind::parse("box", None, None).unwrap(), BlurKind::Box);
        assert_eq!(
            BlurKind::parse("gaussian", None, None).unwrap(),
            BlurKind::Gaussian { sigma: DEFAULT_SIGMA }
        );
        assert_eq!(
            BlurKind::parse("median", None, Some(3)).unwrap(),
            BlurKind::Median { radius: 3 }
        );
        assert!(BlurKind::parse("gaussian", Some(0.0), None).is_err());
        assert!(BlurKind::parse("median", None, Some(0)).is_err());
        assert!(matches!(
            BlurKind::parse("motion", None, None),
            Err(ImageError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_blur_variants_keep_uniform_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(12, 9, Rgb([90, 90, 90])));
        for kind in [
            BlurKind::Box,
            BlurKind::Gaussian { sigma: 1.5 },
            BlurKind::Median { radius: 1 },
        ] {
            let out = blur_variant(&img, kind).to_rgb8();
            assert_eq!(out.dimensions(), (12, 9));
            // Float kernels may land a hair under the input value
            assert!(
                out.pixels().flat_map(|p| p.0).all(|v| (89..=90).contains(&v)),
                "{kind:?}"
            );
        }
    }

    #[test]
    fn test_median_removes_salt_noise() {
        let mut rgb = RgbImage::from_pixel(5, 5, Rgb([0, 0, 0]));
        rgb.put_pixel(2, 2, Rgb([255, 255, 255]));
        let out = blur_variant(&DynamicImage::ImageRgb8(rgb), BlurKind::Median { radius: 1 });
        assert_eq!(out.to_rgb8().get_pixel(2, 2).0, [0, 0, 0]);
    }

    // ===== Edges =====

    #[test]
    fn test_edge_kind_parse() {
        assert_eq!(EdgeKind::parse("sobel", None, None).unwrap(), EdgeKind::Sobel);
        assert_eq!(
            EdgeKind::parse("canny", None, None).unwrap(),
            EdgeKind::Canny {
                low: DEFAULT_CANNY_LOW,
                high: DEFAULT_CANNY_HIGH
            }
        );
        assert!(EdgeKind::parse("canny", Some(80.0), Some(20.0)).is_err());
        assert!(EdgeKind::parse("laplace", None, None).is_err());
    }

    #[test]
    fn test_sobel_flat_image_has_no_edges() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([128, 128, 128])));
        let out = detect_edges(&img, EdgeKind::Sobel).to_luma8();
        assert!(out.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_sobel_finds_vertical_edge() {
        let out = detect_edges(&split_image(10, 10, 0, 255), EdgeKind::Sobel).to_luma8();
        assert_eq!(out.get_pixel(5, 5).0, [255]);
        assert_eq!(out.get_pixel(1, 5).0, [0]);
    }

    #[test]
    fn test_canny_output_is_single_channel() {
        let out = detect_edges(
            &split_image(16, 16, 0, 255),
            EdgeKind::Canny { low: 20.0, high: 60.0 },
        );
        assert_eq!(out.color(), image::ColorType::L8);
        assert!(out.to_luma8().pixels().any(|p| p.0[0] == 255));
    }
}
