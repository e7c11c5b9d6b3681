//! Wire shapes for the gateway.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound streaming message: `{"type": "text"|"image"|"audio", "payload": ...}`.
/// Payload validation happens in the session layer so a malformed event can
/// never mutate session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: Value,
}

/// `POST /mood/text` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextMoodRequest {
    pub text: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Privilege is decided by the caller's auth layer; the pipeline only
    /// consumes the resulting flag.
    #[serde(default)]
    pub privileged: bool,
}

/// `POST /mood/multimodal` request body: any subset of the three modalities,
/// media as base64.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultimodalMoodRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub audio_base64: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub privileged: bool,
}

/// Structured error reply, used on both the WebSocket and HTTP surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}

impl ErrorReply {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
