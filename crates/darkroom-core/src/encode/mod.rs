//! Image encoding pipeline for Darkroom.
//!
//! This module provides functionality for:
//! - Encoding bitmaps to PNG for the session and HTTP responses
//! - Converting bitmaps to JPEG, BMP, GIF or TIFF on request
//!
//! # Examples
//!
//! ```ignore
//! use darkroom_core::encode::{encode_image, OutputFormat};
//!
//! let bytes = encode_image(&bitmap, OutputFormat::parse("jpeg")?)?;
//! println!("Encoded {} bytes", bytes.len());
//! ```

mod writer;

pub use writer::{encode_image, encode_png, EncodeError, OutputFormat, JPEG_QUALITY};
