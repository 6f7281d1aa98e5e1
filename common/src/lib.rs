// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! dchook common
//!
//! Request authentication and abuse control for deployment webhooks,
//! shared by the `dchook` receiver and the `dchook-notify` sender:
//!
//! - HMAC-SHA2 envelope signatures restricted to an algorithm allowlist
//! - Version/commit compatibility gating
//! - Replay guard, success-rate limiting and failure-triggered bans
//! - Envelope encoding and printable-text payload classification

pub mod abuse;
pub mod build_info;
pub mod compat;
pub mod config;
pub mod envelope;
pub mod error;
pub mod identity;
pub mod signature;

pub use abuse::AbuseController;
pub use build_info::BuildInfo;
pub use compat::is_version_compatible;
pub use config::AbuseConfig;
pub use envelope::{is_printable_text, payload_from_bytes, Envelope, EnvelopeHeader};
pub use error::{AlgorithmError, EnvelopeError, SignatureError};
pub use identity::ClientIdentity;
pub use signature::{generate_signature, verify_signature, Algorithm, AlgorithmSet};

/// Maximum size of the caller payload before it is wrapped in an envelope (1 MiB).
pub const MAX_PAYLOAD_SIZE: usize = 1 << 20;

/// Maximum HTTP request body size: the payload plus room for the envelope.
pub const MAX_REQUEST_BODY_SIZE: usize = MAX_PAYLOAD_SIZE + (1 << 8);

/// Request header carrying `<algorithm>:<hex-mac>`.
pub const SIGNATURE_HEADER: &str = "Dchook-Signature";
