//! Wire schemes applied before slicing and after reassembly.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::codec::{CodecError, CodecResult};

/// How a payload is represented inside its slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    /// Standard base64 of the payload bytes (hashes, links, attributes).
    Base64Text,
    /// Payload is already printable UTF-8 and stored verbatim.
    Utf8Text,
    /// Raw bytes; pair with a pad marker.
    Binary,
}

impl Scheme {
    /// Convert payload bytes into the bytes that are sliced into slots.
    pub fn to_wire(&self, payload: &[u8]) -> CodecResult<Vec<u8>> {
        match self {
            Scheme::Base64Text => Ok(BASE64.encode(payload).into_bytes()),
            Scheme::Utf8Text => {
                std::str::from_utf8(payload)
                    .map_err(|e| CodecError::Decode(format!("payload is not UTF-8: {}", e)))?;
                // NUL would be eaten by the zero fill of the contract word.
                if payload.contains(&0) {
                    return Err(CodecError::AmbiguousPadding(
                        "text payload contains a NUL byte".to_string(),
                    ));
                }
                Ok(payload.to_vec())
            }
            Scheme::Binary => Ok(payload.to_vec()),
        }
    }

    /// Convert reassembled wire bytes back into the payload.
    pub fn from_wire(&self, wire: Vec<u8>) -> CodecResult<Vec<u8>> {
        match self {
            Scheme::Base64Text => BASE64
                .decode(&wire)
                .map_err(|e| CodecError::Decode(format!("invalid base64: {}", e))),
            Scheme::Utf8Text => String::from_utf8(wire)
                .map(String::into_bytes)
                .map_err(|e| CodecError::Decode(format!("invalid UTF-8: {}", e))),
            Scheme::Binary => Ok(wire),
        }
    }
}
