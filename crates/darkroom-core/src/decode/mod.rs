//! Image decoding pipeline for Darkroom.
//!
//! This module provides functionality for:
//! - Sniffing the container format of uploaded bytes
//! - Decoding PNG, JPEG, BMP, GIF and TIFF into an in-memory bitmap
//! - Optionally applying the EXIF orientation tag
//!
//! All operations are synchronous. Callers running inside an async runtime
//! are expected to move decoding onto a blocking thread.
//!
//! # Examples
//!
//! ```ignore
//! use darkroom_core::decode::{decode_image, DecodeOptions};
//!
//! let bytes = std::fs::read("photo.png").unwrap();
//! let image = decode_image(&bytes, DecodeOptions::default()).unwrap();
//! println!("Decoded {}x{} image", image.width(), image.height());
//! ```

mod reader;
mod types;

pub use reader::{decode_image, extract_orientation};
pub use types::{DecodeError, DecodeOptions, Orientation};
