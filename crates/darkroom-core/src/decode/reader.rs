//! Format-sniffing image decoding with optional EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{DecodeError, DecodeOptions, Orientation};
use crate::Bitmap;

/// Decode an encoded image (PNG, JPEG, BMP, GIF, TIFF) into a bitmap.
///
/// The container format is detected from the leading bytes, not from any
/// caller-supplied hint. The bitmap keeps the source color type, so an RGBA
/// PNG stays RGBA.
///
/// # Errors
///
/// Returns `DecodeError::Empty` for an empty slice,
/// `DecodeError::InvalidFormat` when the format cannot be recognized,
/// `DecodeError::CorruptedFile` when the decoder fails and
/// `DecodeError::InvalidDimensions` for zero-sized images.
pub fn decode_image(bytes: &[u8], options: DecodeOptions) -> Result<Bitmap, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if img.width() == 0 || img.height() == 0 {
        return Err(DecodeError::InvalidDimensions {
            width: img.width(),
            height: img.height(),
        });
    }

    if options.auto_orient {
        Ok(apply_orientation(img, extract_orientation(bytes)))
    } else {
        Ok(img)
    }
}

/// Extract EXIF orientation from encoded bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
pub fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_png_keeps_pixels() {
        let mut src = RgbImage::new(3, 2);
        src.put_pixel(0, 0, Rgb([255, 0, 0]));
        src.put_pixel(2, 1, Rgb([0, 0, 255]));
        let bytes = encode(DynamicImage::ImageRgb8(src.clone()), ImageFormat::Png);

        let img = decode_image(&bytes, DecodeOptions::default()).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
        assert_eq!(img.to_rgb8(), src);
    }

    #[test]
    fn test_decode_png_keeps_alpha_channel() {
        let src = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 40]));
        let bytes = encode(DynamicImage::ImageRgba8(src), ImageFormat::Png);

        let img = decode_image(&bytes, DecodeOptions::default()).unwrap();
        assert!(img.color().has_alpha());
        assert_eq!(img.to_rgba8().get_pixel(1, 1).0, [10, 20, 30, 40]);
    }

    #[test]
    fn test_decode_jpeg() {
        let src = RgbImage::from_pixel(8, 8, Rgb([120, 120, 120]));
        let bytes = encode(DynamicImage::ImageRgb8(src), ImageFormat::Jpeg);

        let img = decode_image(&bytes, DecodeOptions { auto_orient: true }).unwrap();
        assert_eq!((img.width(), img.height()), (8, 8));
    }

    #[test]
    fn test_decode_empty_bytes() {
        assert!(matches!(
            decode_image(&[], DecodeOptions::default()),
            Err(DecodeError::Empty)
        ));
    }

    #[test]
    fn test_decode_unrecognized_bytes() {
        let result = decode_image(&[0x00, 0x01, 0x02, 0x03], DecodeOptions::default());
        assert!(matches!(result, Err(DecodeError::InvalidFormat)));
    }

    #[test]
    fn test_decode_truncated_png() {
        let src = RgbImage::from_pixel(16, 16, Rgb([1, 2, 3]));
        let bytes = encode(DynamicImage::ImageRgb8(src), ImageFormat::Png);

        let result = decode_image(&bytes[..bytes.len() / 2], DecodeOptions::default());
        assert!(matches!(result, Err(DecodeError::CorruptedFile(_))));
    }

    #[test]
    fn test_orientation_extraction_without_exif() {
        let src = RgbImage::from_pixel(2, 2, Rgb([0, 0, 0]));
        let bytes = encode(DynamicImage::ImageRgb8(src), ImageFormat::Png);
        assert_eq!(extract_orientation(&bytes), Orientation::Normal);
        assert_eq!(extract_orientation(&[0x00, 0x01]), Orientation::Normal);
    }

    #[test]
    fn test_apply_orientation_rotate90() {
        let mut src = RgbImage::new(2, 1);
        src.put_pixel(0, 0, Rgb([255, 0, 0]));
        src.put_pixel(1, 0, Rgb([0, 255, 0]));

        let result = apply_orientation(DynamicImage::ImageRgb8(src), Orientation::Rotate90CW);
        let rgb = result.into_rgb8();
        assert_eq!(rgb.dimensions(), (1, 2));
        // Left pixel ends up on top after a clockwise turn
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_apply_orientation_flip_horizontal() {
        let mut src = RgbImage::new(2, 1);
        src.put_pixel(0, 0, Rgb([255, 0, 0]));
        src.put_pixel(1, 0, Rgb([0, 255, 0]));

        let result = apply_orientation(DynamicImage::ImageRgb8(src), Orientation::FlipHorizontal);
        let rgb = result.into_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [0, 255, 0]);
        assert_eq!(rgb.get_pixel(1, 0).0, [255, 0, 0]);
    }
}
