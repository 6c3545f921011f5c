//! Mirror an image along one axis.

use serde::{Deserialize, Serialize};

use crate::error::ImageError;
use crate::Bitmap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipDirection {
    /// Left and right swap.
    Horizontal,
    /// Top and bottom swap.
    Vertical,
}

impl FlipDirection {
    /// Parse `"horizontal"` or `"vertical"`.
    pub fn parse(name: &str) -> Result<Self, ImageError> {
        match name {
            "horizontal" => Ok(Self::Horizontal),
            "vertical" => Ok(Self::Vertical),
            _ => Err(ImageError::unsupported(
                "Direction must be 'horizontal' or 'vertical'",
            )),
        }
    }
}

pub fn apply_flip(image: &Bitmap, direction: FlipDirection) -> Bitmap {
    match direction {
        FlipDirection::Horizontal => image.fliph(),
        FlipDirection::Vertical => image.flipv(),
    }
}
