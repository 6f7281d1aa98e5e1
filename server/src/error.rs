// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the webhook receiver.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dchook_common::{AlgorithmError, SignatureError};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single webhook request was refused.
///
/// The `Display` form goes to the log; clients only ever see
/// [`Rejection::public_message`].
#[derive(Debug, Error)]
pub enum Rejection {
    #[error("identity is banned")]
    Banned,

    #[error("request body unreadable: {0}")]
    BodyUnreadable(String),

    #[error("signature rejected: {0}")]
    Signature(#[from] SignatureError),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("malformed timestamp {0:?}")]
    MalformedTimestamp(String),

    #[error("timestamp {0} replayed or outside the replay window")]
    Replay(i64),

    #[error("version mismatch: client={client_version}/{client_commit} server={server_version}/{server_commit}")]
    VersionIncompatible {
        client_version: String,
        client_commit: String,
        server_version: String,
        server_commit: String,
    },

    #[error("success rate limit exceeded")]
    RateLimited,
}

impl Rejection {
    /// Whether this rejection counts toward a ban. Banned and throttled
    /// callers are never escalated.
    pub fn counts_as_failure(&self) -> bool {
        !matches!(self, Self::Banned | Self::RateLimited)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Banned => StatusCode::FORBIDDEN,
            Self::BodyUnreadable(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Signature(_) => StatusCode::UNAUTHORIZED,
            Self::MalformedEnvelope(_)
            | Self::MalformedTimestamp(_)
            | Self::Replay(_)
            | Self::VersionIncompatible { .. } => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Stable machine-readable code, also used as the metrics label.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Banned => "banned",
            Self::BodyUnreadable(_) => "body_unreadable",
            Self::Signature(_) => "bad_signature",
            Self::MalformedEnvelope(_) => "malformed_envelope",
            Self::MalformedTimestamp(_) => "malformed_timestamp",
            Self::Replay(_) => "replayed_timestamp",
            Self::VersionIncompatible { .. } => "version_mismatch",
            Self::RateLimited => "rate_limited",
        }
    }

    /// Minimal message for the HTTP response.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Banned => "Forbidden",
            Self::BodyUnreadable(_) => "Payload too large",
            Self::Signature(_) => "Unauthorized",
            Self::MalformedEnvelope(_) | Self::MalformedTimestamp(_) => "Bad request",
            Self::Replay(_) => "Invalid or replayed timestamp",
            Self::VersionIncompatible { .. } => "Version mismatch",
            Self::RateLimited => "Rate limit exceeded",
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub code: &'static str,
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.public_message(),
                code: self.code(),
            }),
        )
            .into_response()
    }
}

/// Fatal problems found while starting the receiver.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("{env} environment variable or {flag} flag is required")]
    MissingSetting {
        env: &'static str,
        flag: &'static str,
    },

    #[error("failed to read webhook secret file {path}: {source}")]
    SecretRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("secret file has insecure permissions: {mode:o} (expected 600 or 400)")]
    InsecureSecretPermissions { mode: u32 },

    #[error("secret file must be a regular file or named pipe: {0}")]
    SecretNotRegular(PathBuf),

    #[error("compose file not found: {0}")]
    ComposeFileMissing(PathBuf),

    #[error(transparent)]
    Algorithms(#[from] AlgorithmError),

    #[error("cannot access docker: {0} (ensure docker is running and the user has access)")]
    DockerUnavailable(String),
}
