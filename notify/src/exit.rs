// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Exit codes for dchook-notify.
//!
//! Pre-send problems use 1-9; receiver answers map to codes derived from
//! the HTTP status so scripts can tell a ban from a throttle.

use std::process::ExitCode;
use thiserror::Error;

pub const EXIT_CONFIG: u8 = 1;
pub const EXIT_PAYLOAD: u8 = 2;
pub const EXIT_REQUEST: u8 = 3;
pub const EXIT_PAYLOAD_TOO_LARGE: u8 = 13;
pub const EXIT_RATE_LIMITED: u8 = 29;
pub const EXIT_BAD_REQUEST: u8 = 40;
pub const EXIT_UNAUTHORIZED: u8 = 41;
pub const EXIT_FORBIDDEN: u8 = 43;
pub const EXIT_SERVER_ERROR: u8 = 50;
pub const EXIT_UNKNOWN_STATUS: u8 = 99;

#[derive(Debug, Error)]
pub enum Exit {
    #[error("Error: {0}")]
    Config(String),

    #[error("Error: {0}")]
    Payload(String),

    #[error("Error: {0}")]
    Request(String),

    #[error("✗ Webhook rejected (status: {status}){}", response_suffix(.body))]
    Rejected { status: u16, body: String },
}

fn response_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!("\nResponse: {}", body.trim_end())
    }
}

impl Exit {
    pub fn status_code(&self) -> u8 {
        match self {
            Self::Config(_) => EXIT_CONFIG,
            Self::Payload(_) => EXIT_PAYLOAD,
            Self::Request(_) => EXIT_REQUEST,
            Self::Rejected { status, .. } => match status {
                400 => EXIT_BAD_REQUEST,
                401 => EXIT_UNAUTHORIZED,
                403 => EXIT_FORBIDDEN,
                413 => EXIT_PAYLOAD_TOO_LARGE,
                429 => EXIT_RATE_LIMITED,
                500 => EXIT_SERVER_ERROR,
                _ => EXIT_UNKNOWN_STATUS,
            },
        }
    }

    pub fn code(&self) -> ExitCode {
        ExitCode::from(self.status_code())
    }
}
