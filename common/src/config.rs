// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Abuse-control tunables.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Limits for the [`AbuseController`](crate::AbuseController).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbuseConfig {
    /// Accepted requests allowed per identity within the success window (default: 1)
    #[serde(default = "default_success_limit")]
    pub success_limit: u32,

    /// Success window in seconds (default: 60)
    #[serde(default = "default_success_window_secs")]
    pub success_window_secs: u64,

    /// Consecutive failures before a ban (default: 2)
    #[serde(default = "default_fail_limit")]
    pub fail_limit: u32,

    /// Ban length in seconds (default: 3600)
    #[serde(default = "default_ban_duration_secs")]
    pub ban_duration_secs: u64,

    /// How long a seen envelope timestamp is remembered, in seconds (default: 600)
    #[serde(default = "default_replay_retention_secs")]
    pub replay_retention_secs: u64,
}

fn default_success_limit() -> u32 {
    1
}

fn default_success_window_secs() -> u64 {
    60
}

fn default_fail_limit() -> u32 {
    2
}

fn default_ban_duration_secs() -> u64 {
    3600
}

fn default_replay_retention_secs() -> u64 {
    600
}

impl Default for AbuseConfig {
    fn default() -> Self {
        Self {
            success_limit: default_success_limit(),
            success_window_secs: default_success_window_secs(),
            fail_limit: default_fail_limit(),
            ban_duration_secs: default_ban_duration_secs(),
            replay_retention_secs: default_replay_retention_secs(),
        }
    }
}

impl AbuseConfig {
    pub fn success_window(&self) -> Duration {
        Duration::from_secs(self.success_window_secs)
    }

    pub fn ban_duration(&self) -> Duration {
        Duration::from_secs(self.ban_duration_secs)
    }

    pub fn replay_retention(&self) -> Duration {
        Duration::from_secs(self.replay_retention_secs)
    }
}
