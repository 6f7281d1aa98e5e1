// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Command-line and environment configuration for the receiver.
//!
//! Every flag has an environment fallback; a flag given on the command line
//! wins over the environment.

use crate::error::StartupError;
use clap::builder::BoolishValueParser;
use clap::Parser;
use dchook_common::{AbuseConfig, AlgorithmSet};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "dchook",
    about = "Secure webhook receiver for Docker Compose deployments",
    after_help = "Endpoints:\n  POST /deploy    Trigger deployment (requires valid signature)\n  GET  /health    Health check\n  GET  /version   Version information (only if enabled)\n  GET  /metrics   Prometheus metrics (unless disabled)"
)]
pub struct Args {
    /// Path to webhook secret file
    #[arg(short = 's', long, env = "DCHOOK_SECRET_FILE")]
    pub secret_file: Option<PathBuf>,

    /// Path to docker-compose.yml to manage
    #[arg(short = 'c', long, env = "DCHOOK_COMPOSE_FILE")]
    pub compose_file: Option<PathBuf>,

    /// Bind address
    #[arg(short = 'b', long, env = "DCHOOK_BIND_ADDRESS", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub bind_address: IpAddr,

    /// HTTP port to listen on
    #[arg(short = 'p', long, env = "DCHOOK_PORT", default_value_t = 7999)]
    pub port: u16,

    /// Comma-separated list of allowed HMAC algorithms
    #[arg(long, env = "DCHOOK_ALLOWED_ALGORITHMS", default_value = "sha256,sha384,sha512")]
    pub algorithms: String,

    /// Enable the /version endpoint
    #[arg(long, env = "DCHOOK_ENABLE_VERSION_ENDPOINT", value_parser = BoolishValueParser::new())]
    pub enable_version_endpoint: bool,

    /// Disable the /metrics endpoint
    #[arg(long, env = "DCHOOK_DISABLE_METRICS", value_parser = BoolishValueParser::new())]
    pub disable_metrics: bool,

    /// Accepted deployments per client within the success window
    #[arg(long, env = "DCHOOK_SUCCESS_LIMIT", default_value_t = 1)]
    pub success_limit: u32,

    /// Success window in seconds
    #[arg(long, env = "DCHOOK_SUCCESS_WINDOW_SECS", default_value_t = 60)]
    pub success_window_secs: u64,

    /// Consecutive failed attempts before a client is banned
    #[arg(long, env = "DCHOOK_FAIL_LIMIT", default_value_t = 2)]
    pub fail_limit: u32,

    /// Ban length in seconds
    #[arg(long, env = "DCHOOK_BAN_DURATION_SECS", default_value_t = 3600)]
    pub ban_duration_secs: u64,

    /// How long seen request timestamps are remembered, in seconds
    #[arg(long, env = "DCHOOK_REPLAY_RETENTION_SECS", default_value_t = 600)]
    pub replay_retention_secs: u64,

    /// Show version information
    #[arg(long)]
    pub version: bool,
}

/// Resolved receiver configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub secret_file: PathBuf,
    pub compose_file: PathBuf,
    pub allowed_algorithms: AlgorithmSet,
    pub enable_version_endpoint: bool,
    pub metrics_enabled: bool,
    pub abuse: AbuseConfig,
}

impl Args {
    /// Validate the arguments into a [`Config`].
    pub fn into_config(self) -> Result<Config, StartupError> {
        let secret_file = self.secret_file.ok_or(StartupError::MissingSetting {
            env: "DCHOOK_SECRET_FILE",
            flag: "-s",
        })?;
        let compose_file = self.compose_file.ok_or(StartupError::MissingSetting {
            env: "DCHOOK_COMPOSE_FILE",
            flag: "-c",
        })?;
        let allowed_algorithms = AlgorithmSet::parse_list(&self.algorithms)?;

        Ok(Config {
            bind_addr: SocketAddr::new(self.bind_address, self.port),
            secret_file,
            compose_file,
            allowed_algorithms,
            enable_version_endpoint: self.enable_version_endpoint,
            metrics_enabled: !self.disable_metrics,
            abuse: AbuseConfig {
                success_limit: self.success_limit,
                success_window_secs: self.success_window_secs,
                fail_limit: self.fail_limit,
                ban_duration_secs: self.ban_duration_secs,
                replay_retention_secs: self.replay_retention_secs,
            },
        })
    }
}
