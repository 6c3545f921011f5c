//! Base64 and data-URL handling for images crossing the wire.
//!
//! Clients send images either as raw base64 or prefixed with a
//! `data:image/<fmt>;base64,` scheme. Responses always carry the prefix.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::decode::{decode_image, DecodeError, DecodeOptions};
use crate::encode::{encode_png, EncodeError};
use crate::Bitmap;

/// Drop everything up to and including the first comma.
///
/// Strings without a comma are returned unchanged.
pub fn strip_data_url(payload: &str) -> &str {
    match payload.split_once(',') {
        Some((_, data)) => data,
        None => payload,
    }
}

/// Decode a (possibly data-URL prefixed) base64 payload into raw bytes.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>, DecodeError> {
    let data = strip_data_url(payload).trim();
    if data.is_empty() {
        return Err(DecodeError::Empty);
    }
    let bytes = BASE64
        .decode(data)
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))?;
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(bytes)
}

/// Wrap raw bytes as `data:<mime>;base64,<payload>`.
pub fn to_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

/// Wrap PNG bytes as a `data:image/png;base64,` URL.
pub fn png_data_url(bytes: &[u8]) -> String {
    to_data_url(bytes, "image/png")
}

/// Decode a base64 or data-URL payload all the way to a bitmap.
pub fn bitmap_from_base64(payload: &str, options: DecodeOptions) -> Result<Bitmap, DecodeError> {
    decode_image(&decode_base64(payload)?, options)
}

/// Encode a bitmap as PNG and wrap it in a data URL.
pub fn bitmap_to_data_url(image: &Bitmap) -> Result<String, EncodeError> {
    Ok(png_data_url(&encode_png(image)?))
}
