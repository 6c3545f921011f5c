//! Bitmap encoding for responses and format conversion.
//!
//! PNG is the wire format for everything crossing the session boundary. The
//! other formats exist for the one-shot conversion endpoint.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};
use thiserror::Error;

use crate::Bitmap;

/// JPEG quality used when converting to JPEG.
pub const JPEG_QUALITY: u8 = 90;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The requested output format is not one we can write.
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("Image encoding failed: {0}")]
    EncodingFailed(String),
}

/// Output container formats supported by [`encode_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Lossless PNG (default).
    #[default]
    Png,
    /// Baseline JPEG at [`JPEG_QUALITY`]. Alpha is dropped.
    Jpeg,
    /// Windows bitmap.
    Bmp,
    /// Single-frame GIF.
    Gif,
    /// TIFF.
    Tiff,
}

impl OutputFormat {
    /// Parse a case-insensitive format name such as `"PNG"` or `"jpg"`.
    pub fn parse(name: &str) -> Result<Self, EncodeError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "bmp" => Ok(Self::Bmp),
            "gif" => Ok(Self::Gif),
            "tiff" | "tif" => Ok(Self::Tiff),
            _ => Err(EncodeError::UnsupportedFormat(name.to_string())),
        }
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Bmp => "bmp",
            Self::Gif => "gif",
            Self::Tiff => "tiff",
        }
    }

    /// MIME type, e.g. `image/png`.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Bmp => "image/bmp",
            Self::Gif => "image/gif",
            Self::Tiff => "image/tiff",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Bmp => ImageFormat::Bmp,
            Self::Gif => ImageFormat::Gif,
            Self::Tiff => ImageFormat::Tiff,
        }
    }
}

/// Encode a bitmap into the given container format.
///
/// 8-bit gray/RGB(A) bitmaps are written as-is where the format allows it.
/// Anything else (16-bit, float) is converted to RGBA8 first; JPEG always
/// receives RGB8.
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` for empty bitmaps and
/// `EncodeError::EncodingFailed` when the encoder rejects the data.
pub fn encode_image(image: &Bitmap, format: OutputFormat) -> Result<Vec<u8>, EncodeError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: image.width(),
            height: image.height(),
        });
    }

    let mut buffer = Cursor::new(Vec::new());

    match format {
        OutputFormat::Jpeg => {
            let rgb = image.to_rgb8();
            JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY)
                .write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ExtendedColorType::Rgb8,
                )
                .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
        }
        OutputFormat::Gif => {
            DynamicImage::ImageRgba8(image.to_rgba8())
                .write_to(&mut buffer, ImageFormat::Gif)
                .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
        }
        other => {
            let normalized;
            let source = if is_plain_8bit(image.color()) {
                image
            } else {
                normalized = DynamicImage::ImageRgba8(image.to_rgba8());
                &normalized
            };
            source
                .write_to(&mut buffer, other.image_format())
                .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
        }
    }

    Ok(buffer.into_inner())
}

/// Encode a bitmap as PNG bytes.
pub fn encode_png(image: &Bitmap) -> Result<Vec<u8>, EncodeError> {
    encode_image(image, OutputFormat::Png)
}

fn is_plain_8bit(color: ColorType) -> bool {
    matches!(
        color,
        ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8
    )
}
