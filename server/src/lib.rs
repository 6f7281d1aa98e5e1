// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! dchook
//!
//! Authenticated webhook receiver that restarts a Docker Compose project.
//! Every `POST /deploy` runs through a fixed validation pipeline:
//!
//! - Ban check for the resolved client identity
//! - Bounded body read
//! - HMAC signature verification against an algorithm allowlist
//! - Envelope and timestamp decoding
//! - Replay guard
//! - Version/commit compatibility
//! - Success-rate limit
//!
//! Failed authentication or validation counts toward a temporary ban;
//! throttling and already-banned callers do not.

pub mod client_ip;
pub mod config;
pub mod deploy;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod pipeline;
pub mod secret;

pub use config::{Args, Config};
pub use deploy::{ComposeDeployer, DeployTrigger, Deployer};
pub use error::{Rejection, StartupError};
pub use handlers::{router, AppState};
pub use pipeline::Pipeline;
