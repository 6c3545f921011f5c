//! Editing Session: per-connection state machine.
//!
//! A session owns at most one original image. Every message produces at
//! most one reply; nothing here touches sockets, so the state machine can be
//! driven directly in tests.

use std::sync::Arc;

use darkroom_core::codec::{decode_base64, png_data_url};
use darkroom_core::{apply_filters, FilterParams, ImageBackend, ImageError};

use crate::protocol::{ClientMessage, ServerMessage};

pub const NOT_INITIALIZED: &str = "Image not initialized";

enum Phase<I> {
    Uninitialized,
    Ready { original: I },
    Closed,
}

/// Externally visible session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    Closed,
}

pub struct EditingSession<B: ImageBackend> {
    backend: Arc<B>,
    phase: Phase<B::Image>,
}

impl<B: ImageBackend> EditingSession<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            phase: Phase::Uninitialized,
        }
    }

    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::Uninitialized => SessionState::Uninitialized,
            Phase::Ready { .. } => SessionState::Ready,
            Phase::Closed => SessionState::Closed,
        }
    }

    /// Parse a raw text frame and handle it. Unparseable frames produce an
    /// error reply and leave the state alone.
    pub fn handle_text(&mut self, text: &str) -> Option<ServerMessage> {
        if matches!(self.phase, Phase::Closed) {
            return None;
        }
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => self.handle(message),
            Err(err) => {
                tracing::debug!(error = %err, "rejecting malformed message");
                Some(ServerMessage::error(format!("Invalid message: {err}")))
            }
        }
    }

    /// Handle one message. Returns `None` only once the session is closed.
    pub fn handle(&mut self, message: ClientMessage) -> Option<ServerMessage> {
        if matches!(self.phase, Phase::Closed) {
            return None;
        }
        let kind = message.kind();
        let result = match message {
            ClientMessage::Init { image_data } => self.init(&image_data),
            ClientMessage::ApplyFilters(params) => self.apply(&params),
            ClientMessage::Reset => self.reset(),
        };
        Some(result.unwrap_or_else(|err| {
            tracing::debug!(message_type = kind, error = %err, "message failed");
            ServerMessage::error(err.to_string())
        }))
    }

    /// Drop the stored original. Later messages are ignored.
    pub fn close(&mut self) {
        self.phase = Phase::Closed;
    }

    fn init(&mut self, image_data: &str) -> Result<ServerMessage, ImageError> {
        // Decode fully before replacing anything so a bad payload keeps the
        // previous original.
        let bytes = decode_base64(image_data)?;
        let original = self.backend.decode(&bytes)?;
        let (width, height) = self.backend.dimensions(&original);
        tracing::debug!(width, height, bytes = bytes.len(), "session image stored");
        self.phase = Phase::Ready { original };
        Ok(ServerMessage::ready())
    }

    fn apply(&self, params: &FilterParams) -> Result<ServerMessage, ImageError> {
        let original = self.original()?;
        let filtered = apply_filters(self.backend.as_ref(), original, params)?;
        Ok(ServerMessage::FilterResult {
            image: self.encode(&filtered)?,
        })
    }

    fn reset(&self) -> Result<ServerMessage, ImageError> {
        let original = self.original()?;
        Ok(ServerMessage::ResetResult {
            image: self.encode(original)?,
        })
    }

    fn original(&self) -> Result<&B::Image, ImageError> {
        match &self.phase {
            Phase::Ready { original } => Ok(original),
            _ => Err(ImageError::validation(NOT_INITIALIZED)),
        }
    }

    fn encode(&self, image: &B::Image) -> Result<String, ImageError> {
        Ok(png_data_url(&self.backend.encode_png(image)?))
    }
}
