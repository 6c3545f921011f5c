//! Top-level error type for image operations.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;

/// Errors surfaced by backends, the filter pipeline and transforms.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The payload could not be turned into a bitmap.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The bitmap could not be serialized.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Parameters are out of range for the image they apply to.
    #[error("{0}")]
    Validation(String),

    /// An operation or option name that is not recognized.
    #[error("{0}")]
    UnsupportedOperation(String),
}

impl ImageError {
    /// Shorthand for [`ImageError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Shorthand for [`ImageError::UnsupportedOperation`].
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedOperation(msg.into())
    }

    /// True for faults caused by the caller's input rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Encode(EncodeError::EncodingFailed(_)))
    }
}
