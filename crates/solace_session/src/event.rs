//! Inbound streaming event parsing.
//!
//! Parsing happens before any session state is touched, so a malformed event
//! can never leave a session half-updated or trigger a fusion pass.

use serde_json::Value;
use solace_core::SessionError;

/// A validated inbound modality event.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Text(String),
    Image(Vec<u8>),
    Audio(Vec<u8>),
}

impl InboundEvent {
    /// Validate `{type, payload}` wire input. Text events carry a string
    /// payload; image and audio events carry a JSON array of byte values.
    pub fn parse(kind: &str, payload: &Value) -> Result<Self, SessionError> {
        match kind {
            "text" => match payload.as_str() {
                Some(text) => Ok(InboundEvent::Text(text.to_string())),
                None => Err(SessionError::InvalidEventFormat(
                    "text payload must be a string".to_string(),
                )),
            },
            "image" => Ok(InboundEvent::Image(parse_bytes(payload, "image")?)),
            "audio" => Ok(InboundEvent::Audio(parse_bytes(payload, "audio")?)),
            other => Err(SessionError::InvalidEventFormat(format!(
                "unknown event type '{}'",
                other
            ))),
        }
    }
}

fn parse_bytes(payload: &Value, kind: &str) -> Result<Vec<u8>, SessionError> {
    let values = payload.as_array().ok_or_else(|| {
        SessionError::InvalidEventFormat(format!("{} payload must be a byte array", kind))
    })?;

    values
        .iter()
        .map(|v| {
            v.as_u64()
                .filter(|n| *n <= u8::MAX as u64)
                .map(|n| n as u8)
                .ok_or_else(|| {
                    SessionError::InvalidEventFormat(format!(
                        "{} payload contains a non-byte value",
                        kind
                    ))
                })
        })
        .collect()
}
