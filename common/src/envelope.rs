// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! The signed webhook envelope.
//!
//! ```text
//! {
//!   "dchook": { "version": "...", "commit": "...", "timestamp": "<microseconds>" },
//!   "payload": <any JSON value, or a string for plain-text payloads>
//! }
//! ```
//!
//! The signature covers the serialized envelope bytes exactly as sent, so
//! the receiver verifies before it decodes.

use crate::error::EnvelopeError;
use crate::MAX_PAYLOAD_SIZE;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sender metadata carried alongside the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeHeader {
    pub version: String,
    pub commit: String,
    /// Microseconds since the Unix epoch, as a decimal string.
    pub timestamp: String,
}

/// Authenticated unit sent to the receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub dchook: EnvelopeHeader,
    #[serde(default)]
    pub payload: Value,
}

impl Envelope {
    pub fn new(
        version: impl Into<String>,
        commit: impl Into<String>,
        timestamp_micros: i64,
        payload: Value,
    ) -> Self {
        Self {
            dchook: EnvelopeHeader {
                version: version.into(),
                commit: commit.into(),
                timestamp: timestamp_micros.to_string(),
            },
            payload,
        }
    }

    /// Decode an envelope from raw (already authenticated) request bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Serialize to the exact bytes that get signed and sent.
    pub fn to_vec(&self) -> Result<Vec<u8>, EnvelopeError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse the header timestamp as integer microseconds.
    pub fn timestamp_micros(&self) -> Result<i64, EnvelopeError> {
        self.dchook
            .timestamp
            .parse()
            .map_err(|_| EnvelopeError::MalformedTimestamp(self.dchook.timestamp.clone()))
    }
}

/// Turn raw payload bytes into the envelope's `payload` value.
///
/// JSON is embedded as-is; otherwise printable text is embedded as a JSON
/// string. Anything else is refused.
pub fn payload_from_bytes(raw: &[u8]) -> Result<Value, EnvelopeError> {
    if raw.len() > MAX_PAYLOAD_SIZE {
        return Err(EnvelopeError::PayloadTooLarge {
            size: raw.len(),
            limit: MAX_PAYLOAD_SIZE,
        });
    }

    match serde_json::from_slice(raw) {
        Ok(value) => Ok(value),
        Err(_) if is_printable_text(raw) => {
            Ok(Value::String(String::from_utf8_lossy(raw).into_owned()))
        }
        Err(_) => Err(EnvelopeError::UnprintablePayload),
    }
}

/// True when `data` is valid UTF-8 free of control characters other than
/// tab, newline and carriage return. Empty input is printable.
pub fn is_printable_text(data: &[u8]) -> bool {
    String::from_utf8_lossy(data).chars().all(|c| {
        c != char::REPLACEMENT_CHARACTER
            && (c >= ' ' || matches!(c, '\t' | '\n' | '\r'))
            && c != '\u{7f}'
    })
}
