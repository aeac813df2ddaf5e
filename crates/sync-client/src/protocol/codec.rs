//! Frame codec
//!
//! One text frame carries one JSON object with a `type` discriminator.

use super::{Envelope, InboundFrame, InboundMessage, MessageType, OutboundMessage};
use serde::Deserialize;
use serde_json::Value;

/// Codec errors
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Frame is not a JSON object")]
    NotAnObject,

    #[error("Frame has no type")]
    MissingType,

    #[error("Invalid {kind} payload: {source}")]
    InvalidPayload {
        kind: MessageType,
        #[source]
        source: serde_json::Error,
    },
}

/// Result of decoding one inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A frame this client understands
    Message(InboundFrame),
    /// A well-formed frame of a type this client does not handle
    Ignored(String),
}

/// JSON frame codec
pub struct Codec;

impl Codec {
    /// Encode an outbound message into a text frame
    ///
    /// # Errors
    /// Returns an error if the message cannot be serialized
    pub fn encode(message: &OutboundMessage) -> Result<String, CodecError> {
        let value = message.to_value()?;
        Ok(serde_json::to_string(&value)?)
    }

    /// Decode a text frame
    ///
    /// # Errors
    /// Returns an error for malformed JSON, a missing `type`, or a payload that
    /// does not match its type
    pub fn decode(text: &str) -> Result<Decoded, CodecError> {
        let value: Value = serde_json::from_str(text)?;

        let Value::Object(object) = &value else {
            return Err(CodecError::NotAnObject);
        };

        let raw_type = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or(CodecError::MissingType)?;

        let kind = match MessageType::from_str(raw_type) {
            Some(kind) if kind.is_inbound() => kind,
            _ => return Ok(Decoded::Ignored(raw_type.to_string())),
        };

        let envelope = Envelope::deserialize(&value).unwrap_or_default();
        let message = InboundMessage::deserialize(value)
            .map_err(|source| CodecError::InvalidPayload { kind, source })?;

        Ok(Decoded::Message(InboundFrame { message, envelope }))
    }
}
