// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for signature checks and envelope handling.

use thiserror::Error;

/// Why a presented signature was refused.
///
/// None of the variants carry the secret or either MAC value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("malformed signature header")]
    Malformed,

    #[error("algorithm {0:?} is not allowed")]
    AlgorithmNotAllowed(String),

    #[error("signature does not match payload")]
    BadMac,
}

/// Errors building or decoding an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("malformed timestamp {0:?}")]
    MalformedTimestamp(String),

    #[error("payload must be valid JSON or printable UTF-8 text")]
    UnprintablePayload,

    #[error("payload is {size} bytes, limit is {limit}")]
    PayloadTooLarge { size: usize, limit: usize },
}

/// Errors parsing an algorithm allowlist.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlgorithmError {
    #[error("invalid algorithm: {0} (must be sha256, sha384, or sha512)")]
    Unsupported(String),

    #[error("algorithm allowlist is empty")]
    Empty,
}
