//! WebSocket message envelopes.
//!
//! Both directions are JSON objects with a `type` discriminator.

use darkroom_core::FilterParams;
use serde::{Deserialize, Serialize};

/// Messages sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Store a new original image (data-URL or raw base64).
    Init {
        #[serde(default)]
        image_data: String,
    },
    /// Derive a filtered image from the stored original.
    ApplyFilters(FilterParams),
    /// Resend the stored original.
    Reset,
}

impl ClientMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::ApplyFilters(_) => "apply_filters",
            Self::Reset => "reset",
        }
    }
}

/// Messages sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Initialized { status: String },
    FilterResult { image: String },
    ResetResult { image: String },
    Error { message: String },
}

impl ServerMessage {
    pub fn ready() -> Self {
        Self::Initialized {
            status: "ready".into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Initialized { .. } => "initialized",
            Self::FilterResult { .. } => "filter_result",
            Self::ResetResult { .. } => "reset_result",
            Self::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_init() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"init","image_data":"data:image/png;base64,AAAA"}"#)
                .unwrap();
        assert_eq!(
            msg,
            ClientMessage::Init {
                image_data: "data:image/png;base64,AAAA".into()
            }
        );
    }

    #[test]
    fn parse_init_without_payload() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"init"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Init { image_data: String::new() });
    }

    #[test]
    fn parse_apply_filters_with_partial_params() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"apply_filters","filter_type":"sepia","brightness":150}"#,
        )
        .unwrap();
        let ClientMessage::ApplyFilters(params) = msg else {
            panic!("expected apply_filters");
        };
        assert_eq!(params.filter_type.as_deref(), Some("sepia"));
        assert_eq!(params.brightness, Some(150.0));
        assert_eq!(params.contrast, None);
    }

    #[test]
    fn parse_apply_filters_bare() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"apply_filters"}"#).unwrap();
        assert_eq!(msg, ClientMessage::ApplyFilters(FilterParams::default()));
        assert_eq!(msg.kind(), "apply_filters");
    }

    #[test]
    fn parse_reset() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"reset"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Reset);
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"explode"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>(r#"{"image_data":"x"}"#).is_err());
    }

    #[test]
    fn server_messages_serialize_with_type_tag() {
        assert_eq!(
            serde_json::to_value(ServerMessage::ready()).unwrap(),
            json!({"type": "initialized", "status": "ready"})
        );
        assert_eq!(
            serde_json::to_value(ServerMessage::FilterResult { image: "x".into() }).unwrap(),
            json!({"type": "filter_result", "image": "x"})
        );
        assert_eq!(
            serde_json::to_value(ServerMessage::ResetResult { image: "y".into() }).unwrap(),
            json!({"type": "reset_result", "image": "y"})
        );
        assert_eq!(
            serde_json::to_value(ServerMessage::error("boom")).unwrap(),
            json!({"type": "error", "message": "boom"})
        );
    }
}
