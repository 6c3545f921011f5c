//! Darkroom Core - Image processing library
//!
//! This crate provides the pixel work behind the Darkroom service: decoding
//! and encoding, the base64/data-URL boundary, the look pipeline (filter,
//! brightness, contrast, saturation), geometric transforms and the extended
//! adjustments. Everything here is synchronous and free of I/O.

pub mod adjustments;
pub mod backend;
pub mod codec;
pub mod decode;
pub mod encode;
pub mod enhance;
pub mod error;
pub mod filters;
pub mod histogram;
pub mod luminance;
pub mod pipeline;
pub mod transform;

pub use backend::{ImageBackend, PixelBackend};
pub use error::ImageError;
pub use pipeline::{apply_filters, FilterKind, FilterParams};
pub use transform::{CropRect, FlipDirection};

/// In-memory decoded image. Keeps whatever color type the source had.
pub type Bitmap = image::DynamicImage;

/// Histogram data for an image
#[derive(Debug, Clone)]
pub struct Histogram {
    /// Red channel histogram (256 bins)
    pub red: [u32; 256],
    /// Green channel histogram (256 bins)
    pub green: [u32; 256],
    /// Blue channel histogram (256 bins)
    pub blue: [u32; 256],
    /// Luminance histogram (256 bins)
    pub luminance: [u32; 256],
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            red: [0; 256],
            green: [0; 256],
            blue: [0; 256],
            luminance: [0; 256],
        }
    }
}

impl Histogram {
    /// Create a new empty histogram
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pixels counted.
    pub fn total(&self) -> u64 {
        self.luminance.iter().map(|&c| c as u64).sum()
    }

    /// Check for highlight clipping (values at 255)
    pub fn has_highlight_clipping(&self) -> bool {
        self.red[255] > 0 || self.green[255] > 0 || self.blue[255] > 0
    }

    /// Check for shadow clipping (values at 0)
    pub fn has_shadow_clipping(&self) -> bool {
        self.red[0] > 0 || self.green[0] > 0 || self.blue[0] > 0
    }
}
