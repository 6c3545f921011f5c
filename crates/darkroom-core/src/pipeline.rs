//! The look pipeline: one optional filter, then brightness, contrast and
//! saturation.
//!
//! ## Stage Order
//! 1. RGB normalization
//! 2. Filter (grayscale, sepia, blur or invert)
//! 3. Brightness
//! 4. Contrast
//! 5. Saturation
//!
//! Stages at their neutral value are skipped entirely. The input image is
//! never modified; every call starts from a fresh copy.

use serde::{Deserialize, Serialize};

use crate::adjustments::{factor_from_percent, is_neutral, NEUTRAL_PERCENT};
use crate::backend::ImageBackend;
use crate::error::ImageError;

/// Parameters for a single pipeline run.
///
/// Absent enhancement values behave as [`NEUTRAL_PERCENT`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// One of `none`, `grayscale`, `sepia`, `blur`, `invert`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f64>,
}

impl FilterParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn brightness(&self) -> f64 {
        self.brightness.unwrap_or(NEUTRAL_PERCENT)
    }

    pub fn contrast(&self) -> f64 {
        self.contrast.unwrap_or(NEUTRAL_PERCENT)
    }

    pub fn saturation(&self) -> f64 {
        self.saturation.unwrap_or(NEUTRAL_PERCENT)
    }

    /// Check if every stage would be skipped.
    pub fn is_default(&self) -> bool {
        matches!(self.filter_kind(), Ok(None))
            && is_neutral(self.brightness())
            && is_neutral(self.contrast())
            && is_neutral(self.saturation())
    }

    /// Reject non-finite enhancement values.
    pub fn validate(&self) -> Result<(), ImageError> {
        for (name, value) in [
            ("brightness", self.brightness),
            ("contrast", self.contrast),
            ("saturation", self.saturation),
        ] {
            if let Some(v) = value.filter(|v| !v.is_finite()) {
                return Err(ImageError::validation(format!(
                    "{name} must be a finite number, got {v}"
                )));
            }
        }
        Ok(())
    }

    /// The selected filter, or `None` when absent or `"none"`.
    pub fn filter_kind(&self) -> Result<Option<FilterKind>, ImageError> {
        match self.filter_type.as_deref() {
            None => Ok(None),
            Some(name) => FilterKind::parse(name),
        }
    }
}

/// Mutually exclusive look filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Grayscale,
    Sepia,
    Blur,
    Invert,
}

impl FilterKind {
    /// Parse a filter name. `"none"` parses to `Ok(None)`.
    pub fn parse(name: &str) -> Result<Option<Self>, ImageError> {
        match name {
            "none" => Ok(None),
            "grayscale" => Ok(Some(Self::Grayscale)),
            "sepia" => Ok(Some(Self::Sepia)),
            "blur" => Ok(Some(Self::Blur)),
            "invert" => Ok(Some(Self::Invert)),
            other => Err(ImageError::unsupported(format!("Unknown filter: {other}"))),
        }
    }
}

/// Derive a filtered image from `original` without touching it.
///
/// # Errors
///
/// Returns `ImageError::UnsupportedOperation` for an unknown filter name and
/// `ImageError::Validation` for a non-finite enhancement value. Parameters
/// are checked before any pixel work starts.
pub fn apply_filters<B: ImageBackend + ?Sized>(
    backend: &B,
    original: &B::Image,
    params: &FilterParams,
) -> Result<B::Image, ImageError> {
    params.validate()?;
    let kind = params.filter_kind()?;

    let mut image = backend.to_rgb(original.clone());

    image = match kind {
        Some(FilterKind::Grayscale) => backend.grayscale(image),
        Some(FilterKind::Sepia) => backend.sepia(image),
        Some(FilterKind::Blur) => backend.blur(image),
        Some(FilterKind::Invert) => backend.invert(image),
        None => image,
    };

    if !is_neutral(params.brightness()) {
        image = backend.brightness(image, factor_from_percent(params.brightness()));
    }
    if !is_neutral(params.contrast()) {
        image = backend.contrast(image, factor_from_percent(params.contrast()));
    }
    if !is_neutral(params.saturation()) {
        image = backend.saturation(image, factor_from_percent(params.saturation()));
    }

    Ok(image)
}

#[cfg(test)]
pub(crate) mod fake {
    //! A backend whose "images" are logs of the operations applied to them.

    use super::*;
    use crate::transform::{CropRect, FlipDirection};

    #[derive(Debug, Clone, PartialEq)]
    pub struct OpLog(pub Vec<String>);

    #[derive(Debug, Default)]
    pub struct RecordingBackend;

    fn push(mut image: OpLog, op: impl Into<String>) -> OpLog {
        image.0.push(op.into());
        image
    }

    impl ImageBackend for RecordingBackend {
        type Image = OpLog;

        fn decode(&self, bytes: &[u8]) -> Result<OpLog, ImageError> {
            Ok(OpLog(vec![format!("decode:{}", String::from_utf8_lossy(bytes))]))
        }
        fn encode_png(&self, image: &OpLog) -> Result<Vec<u8>, ImageError> {
            Ok(image.0.join("|").into_bytes())
        }
        fn dimensions(&self, _image: &OpLog) -> (u32, u32) {
            (1, 1)
        }
        fn to_rgb(&self, image: OpLog) -> OpLog {
            push(image, "rgb")
        }
        fn grayscale(&self, image: OpLog) -> OpLog {
            push(image, "grayscale")
        }
        fn sepia(&self, image: OpLog) -> OpLog {
            push(image, "sepia")
        }
        fn blur(&self, image: OpLog) -> OpLog {
            push(image, "blur")
        }
        fn invert(&self, image: OpLog) -> OpLog {
            push(image, "invert")
        }
        fn brightness(&self, image: OpLog, factor: f32) -> OpLog {
            push(image, format!("brightness:{factor}"))
        }
        fn contrast(&self, image: OpLog, factor: f32) -> OpLog {
            push(image, format!("contrast:{factor}"))
        }
        fn saturation(&self, image: OpLog, factor: f32) -> OpLog {
            push(image, format!("saturation:{factor}"))
        }
        fn crop(&self, image: &OpLog, rect: CropRect) -> Result<OpLog, ImageError> {
            rect.validate(100, 100)?;
            Ok(push(image.clone(), "crop"))
        }
        fn rotate(&self, image: &OpLog, degrees: f64) -> OpLog {
            push(image.clone(), format!("rotate:{degrees}"))
        }
        fn flip(&self, image: &OpLog, direction: FlipDirection) -> OpLog {
            push(image.clone(), format!("flip:{direction:?}"))
        }
        fn resize(
            &self,
            image: &OpLog,
            _width: Option<u32>,
            _height: Option<u32>,
        ) -> Result<OpLog, ImageError> {
            Ok(push(image.clone(), "resize"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::{OpLog, RecordingBackend};
    use super::*;
    use crate::backend::PixelBackend;
    use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

    fn original() -> OpLog {
        OpLog(vec!["orig".into()])
    }

    fn ops(params: &FilterParams) -> Vec<String> {
        apply_filters(&RecordingBackend, &original(), params)
            .unwrap()
            .0
    }

    #[test]
    fn test_neutral_params_only_normalize() {
        assert_eq!(ops(&FilterParams::new()), vec!["orig", "rgb"]);
        assert!(FilterParams::new().is_default());
    }

    #[test]
    fn test_explicit_neutral_values_are_skipped() {
        let params = FilterParams {
            filter_type: Some("none".into()),
            brightness: Some(100.0),
            contrast: Some(100.0),
            saturation: Some(100.0),
        };
        assert!(params.is_default());
        assert_eq!(ops(&params), vec!["orig", "rgb"]);
    }

    #[test]
    fn test_stage_order_is_fixed() {
        let params = FilterParams {
            filter_type: Some("sepia".into()),
            brightness: Some(150.0),
            contrast: Some(50.0),
            saturation: Some(200.0),
        };
        assert_eq!(
            ops(&params),
            vec![
                "orig",
                "rgb",
                "sepia",
                "brightness:1.5",
                "contrast:0.5",
                "saturation:2"
            ]
        );
    }

    #[test]
    fn test_only_non_neutral_stages_run() {
        let params = FilterParams {
            contrast: Some(120.0),
            ..Default::default()
        };
        assert_eq!(ops(&params), vec!["orig", "rgb", "contrast:1.2"]);
    }

    #[test]
    fn test_each_filter_kind() {
        for name in ["grayscale", "sepia", "blur", "invert"] {
            let params = FilterParams {
                filter_type: Some(name.into()),
                ..Default::default()
            };
            assert_eq!(ops(&params), vec!["orig", "rgb", name]);
        }
    }

    #[test]
    fn test_unknown_filter_rejected() {
        let params = FilterParams {
            filter_type: Some("posterize".into()),
            brightness: Some(150.0),
            ..Default::default()
        };
        let err = apply_filters(&RecordingBackend, &original(), &params).unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedOperation(_)));
        assert_eq!(err.to_string(), "Unknown filter: posterize");
    }

    #[test]
    fn test_non_finite_values_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let params = FilterParams {
                contrast: Some(bad),
                ..Default::default()
            };
            let err = apply_filters(&RecordingBackend, &original(), &params).unwrap_err();
            assert!(matches!(err, ImageError::Validation(_)), "accepted {bad}");
        }
        let params = FilterParams {
            brightness: Some(0.0),
            saturation: Some(-50.0),
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_original_is_not_mutated() {
        let orig = original();
        let params = FilterParams {
            filter_type: Some("invert".into()),
            ..Default::default()
        };
        let _ = apply_filters(&RecordingBackend, &orig, &params).unwrap();
        assert_eq!(orig, original());
    }

    #[test]
    fn test_params_deserialize_with_defaults() {
        let params: FilterParams = serde_json::from_str(r#"{"brightness": 120}"#).unwrap();
        assert_eq!(params.brightness(), 120.0);
        assert_eq!(params.contrast(), 100.0);
        assert_eq!(params.filter_type, None);
    }

    // ===== Pixel backend =====

    #[test]
    fn test_neutral_pipeline_equals_normalized_original() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(6, 4, |x, y| {
            Rgba([(x * 40) as u8, (y * 60) as u8, 99, (x * 10) as u8])
        }));
        let out = apply_filters(&PixelBackend::default(), &img, &FilterParams::new()).unwrap();
        assert_eq!(out.to_rgb8(), img.to_rgb8());
    }

    #[test]
    fn test_grayscale_of_solid_red() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([255, 0, 0])));
        let params = FilterParams {
            filter_type: Some("grayscale".into()),
            ..Default::default()
        };
        let out = apply_filters(&PixelBackend::default(), &img, &params)
            .unwrap()
            .to_rgb8();
        assert_eq!(out.dimensions(), (10, 10));
        assert!(out.pixels().all(|p| p.0 == [76, 76, 76]));
    }

    #[test]
    fn test_brightness_doubles_mid_gray() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 3, Rgb([100, 100, 100])));
        let params = FilterParams {
            brightness: Some(200.0),
            ..Default::default()
        };
        let out = apply_filters(&PixelBackend::default(), &img, &params)
            .unwrap()
            .to_rgb8();
        assert!(out.pixels().all(|p| p.0 == [200, 200, 200]));
    }
}
