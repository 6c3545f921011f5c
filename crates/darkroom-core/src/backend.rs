//! The imaging capability interface and its pixel implementation.
//!
//! Session and pipeline code is written against [`ImageBackend`] so it can be
//! exercised with a recording fake instead of real pixels.

use image::DynamicImage;

use crate::adjustments::{apply_brightness, apply_contrast, apply_saturation};
use crate::decode::{decode_image, DecodeOptions};
use crate::encode::encode_png;
use crate::error::ImageError;
use crate::filters;
use crate::transform::{
    apply_crop, apply_flip, apply_resize, apply_rotation, CropRect, FlipDirection, Interpolation,
};
use crate::Bitmap;

/// Operations an imaging library has to provide.
///
/// Filter and enhancement operations take the image by value so
/// implementations can work in place; they expect an image that has been
/// through [`ImageBackend::to_rgb`].
pub trait ImageBackend: Send + Sync {
    type Image: Clone + Send + Sync + 'static;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Image, ImageError>;
    fn encode_png(&self, image: &Self::Image) -> Result<Vec<u8>, ImageError>;
    fn dimensions(&self, image: &Self::Image) -> (u32, u32);

    /// Normalize to 3-channel 8-bit color.
    fn to_rgb(&self, image: Self::Image) -> Self::Image;

    fn grayscale(&self, image: Self::Image) -> Self::Image;
    fn sepia(&self, image: Self::Image) -> Self::Image;
    fn blur(&self, image: Self::Image) -> Self::Image;
    fn invert(&self, image: Self::Image) -> Self::Image;

    /// Enhancement factors are multipliers: 1.0 leaves the image unchanged.
    fn brightness(&self, image: Self::Image, factor: f32) -> Self::Image;
    fn contrast(&self, image: Self::Image, factor: f32) -> Self::Image;
    fn saturation(&self, image: Self::Image, factor: f32) -> Self::Image;

    fn crop(&self, image: &Self::Image, rect: CropRect) -> Result<Self::Image, ImageError>;
    fn rotate(&self, image: &Self::Image, degrees: f64) -> Self::Image;
    fn flip(&self, image: &Self::Image, direction: FlipDirection) -> Self::Image;
    fn resize(
        &self,
        image: &Self::Image,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<Self::Image, ImageError>;
}

/// [`ImageBackend`] over in-memory [`Bitmap`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelBackend {
    pub decode_options: DecodeOptions,
    pub interpolation: Interpolation,
}

impl PixelBackend {
    pub fn new(decode_options: DecodeOptions) -> Self {
        Self {
            decode_options,
            interpolation: Interpolation::default(),
        }
    }

    /// Run `f` over the raw RGB bytes of `image`.
    fn with_rgb_pixels(image: Bitmap, f: impl FnOnce(&mut [u8])) -> Bitmap {
        let mut rgb = image.into_rgb8();
        f(&mut rgb);
        DynamicImage::ImageRgb8(rgb)
    }
}

impl ImageBackend for PixelBackend {
    type Image = Bitmap;

    fn decode(&self, bytes: &[u8]) -> Result<Bitmap, ImageError> {
        Ok(decode_image(bytes, self.decode_options)?)
    }

    fn encode_png(&self, image: &Bitmap) -> Result<Vec<u8>, ImageError> {
        Ok(encode_png(image)?)
    }

    fn dimensions(&self, image: &Bitmap) -> (u32, u32) {
        (image.width(), image.height())
    }

    fn to_rgb(&self, image: Bitmap) -> Bitmap {
        match image {
            DynamicImage::ImageRgb8(_) => image,
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        }
    }

    fn grayscale(&self, image: Bitmap) -> Bitmap {
        Self::with_rgb_pixels(image, filters::grayscale)
    }

    fn sepia(&self, image: Bitmap) -> Bitmap {
        Self::with_rgb_pixels(image, filters::sepia)
    }

    fn blur(&self, image: Bitmap) -> Bitmap {
        DynamicImage::ImageRgb8(filters::blur(&image.into_rgb8()))
    }

    fn invert(&self, image: Bitmap) -> Bitmap {
        Self::with_rgb_pixels(image, filters::invert)
    }

    fn brightness(&self, image: Bitmap, factor: f32) -> Bitmap {
        Self::with_rgb_pixels(image, |px| apply_brightness(px, factor))
    }

    fn contrast(&self, image: Bitmap, factor: f32) -> Bitmap {
        Self::with_rgb_pixels(image, |px| apply_contrast(px, factor))
    }

    fn saturation(&self, image: Bitmap, factor: f32) -> Bitmap {
        Self::with_rgb_pixels(image, |px| apply_saturation(px, factor))
    }

    fn crop(&self, image: &Bitmap, rect: CropRect) -> Result<Bitmap, ImageError> {
        apply_crop(image, rect)
    }

    fn rotate(&self, image: &Bitmap, degrees: f64) -> Bitmap {
        apply_rotation(image, degrees, self.interpolation)
    }

    fn flip(&self, image: &Bitmap, direction: FlipDirection) -> Bitmap {
        apply_flip(image, direction)
    }

    fn resize(
        &self,
        image: &Bitmap,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<Bitmap, ImageError> {
        apply_resize(image, width, height)
    }
}
