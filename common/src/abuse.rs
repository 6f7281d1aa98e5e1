// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-identity abuse control for the webhook endpoint.
//!
//! Combines three mechanisms behind a single lock:
//! 1. Replay guard on envelope timestamps (process-wide)
//! 2. Success-rate limiting per identity (sliding window)
//! 3. Failure-triggered bans per identity
//!
//! Expired entries are swept on access rather than by a background task, so
//! every state transition happens inside one of the calls below.

use crate::config::AbuseConfig;
use crate::identity::ClientIdentity;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Oldest acceptable envelope timestamp, relative to now.
const REPLAY_MAX_AGE_SECS: i64 = 5 * 60;

/// Furthest acceptable envelope timestamp into the future, relative to now.
const REPLAY_MAX_SKEW_SECS: i64 = 60;

/// All mutable abuse state. Only ever touched with the controller lock held.
#[derive(Debug, Default)]
struct AbuseState {
    /// Accepted request times per identity
    successes: HashMap<ClientIdentity, Vec<DateTime<Utc>>>,
    /// Consecutive failures per identity
    failures: HashMap<ClientIdentity, u32>,
    /// Ban expiry per identity
    banned_until: HashMap<ClientIdentity, DateTime<Utc>>,
    /// Envelope timestamp (microseconds) -> when it was first seen
    seen_timestamps: HashMap<i64, DateTime<Utc>>,
}

/// Thread-safe abuse controller.
///
/// Each public call is one atomic read-modify-write over all state. The
/// `*_at` variants take the current time explicitly; the plain variants use
/// the wall clock.
pub struct AbuseController {
    config: AbuseConfig,
    success_window: TimeDelta,
    ban_duration: TimeDelta,
    replay_retention: TimeDelta,
    state: Mutex<AbuseState>,
}

impl AbuseController {
    /// Create a new controller with the given limits.
    pub fn new(config: AbuseConfig) -> Self {
        Self {
            success_window: to_delta(config.success_window()),
            ban_duration: to_delta(config.ban_duration()),
            replay_retention: to_delta(config.replay_retention()),
            config,
            state: Mutex::new(AbuseState::default()),
        }
    }

    /// True while `identity` is serving a ban.
    pub async fn is_banned(&self, identity: &ClientIdentity) -> bool {
        self.is_banned_at(identity, Utc::now()).await
    }

    /// [`is_banned`](Self::is_banned) evaluated at `now`.
    ///
    /// Observing an expired ban clears it together with the failure counter.
    pub async fn is_banned_at(&self, identity: &ClientIdentity, now: DateTime<Utc>) -> bool {
        let mut state = self.state.lock().await;

        if let Some(until) = state.banned_until.get(identity).copied() {
            if now < until {
                return true;
            }
            debug!(%identity, "Ban expired");
            state.banned_until.remove(identity);
            state.failures.remove(identity);
        }
        false
    }

    /// Accept `timestamp_micros` at most once, and only within the replay window.
    pub async fn check_replay(&self, timestamp_micros: i64) -> bool {
        self.check_replay_at(timestamp_micros, Utc::now()).await
    }

    /// [`check_replay`](Self::check_replay) evaluated at `now`.
    ///
    /// The acceptance window is asymmetric: up to five minutes old, at most
    /// one minute ahead. Seen timestamps are remembered for the configured
    /// retention, which is independent of that window.
    pub async fn check_replay_at(&self, timestamp_micros: i64, now: DateTime<Utc>) -> bool {
        let mut state = self.state.lock().await;

        let request_time = match DateTime::<Utc>::from_timestamp_micros(timestamp_micros) {
            Some(t) => t,
            None => return false,
        };
        let oldest = now - TimeDelta::seconds(REPLAY_MAX_AGE_SECS);
        let newest = now + TimeDelta::seconds(REPLAY_MAX_SKEW_SECS);
        if request_time < oldest || request_time > newest {
            debug!(timestamp_micros, "Timestamp outside replay window");
            return false;
        }

        if state.seen_timestamps.contains_key(&timestamp_micros) {
            debug!(timestamp_micros, "Timestamp already seen");
            return false;
        }

        let cutoff = now
            .checked_sub_signed(self.replay_retention)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        state.seen_timestamps.retain(|_, seen_at| *seen_at >= cutoff);
        state.seen_timestamps.insert(timestamp_micros, now);
        true
    }

    /// Count an accepted request. Returns false, changing nothing, when the
    /// identity already used its allowance for the current window.
    pub async fn record_success(&self, identity: &ClientIdentity) -> bool {
        self.record_success_at(identity, Utc::now()).await
    }

    /// [`record_success`](Self::record_success) evaluated at `now`.
    pub async fn record_success_at(&self, identity: &ClientIdentity, now: DateTime<Utc>) -> bool {
        let mut state = self.state.lock().await;

        let cutoff = now
            .checked_sub_signed(self.success_window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let mut recent: Vec<DateTime<Utc>> = state
            .successes
            .get(identity)
            .map(|times| times.iter().copied().filter(|t| *t > cutoff).collect())
            .unwrap_or_default();

        if recent.len() >= self.config.success_limit as usize {
            debug!(%identity, limit = self.config.success_limit, "Success rate limit reached");
            return false;
        }

        recent.push(now);
        state.successes.insert(identity.clone(), recent);
        state.failures.remove(identity);
        true
    }

    /// Count a failed attempt, banning the identity once the fail limit is reached.
    pub async fn record_failure(&self, identity: &ClientIdentity) {
        self.record_failure_at(identity, Utc::now()).await
    }

    /// [`record_failure`](Self::record_failure) evaluated at `now`.
    pub async fn record_failure_at(&self, identity: &ClientIdentity, now: DateTime<Utc>) {
        let mut state = self.state.lock().await;

        let failures = state.failures.entry(identity.clone()).or_insert(0);
        *failures = failures.saturating_add(1);
        let failures = *failures;

        if failures >= self.config.fail_limit {
            let until = now
                .checked_add_signed(self.ban_duration)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            state.banned_until.insert(identity.clone(), until);
            warn!(
                %identity,
                ban_duration_secs = self.config.ban_duration_secs,
                failures,
                "Identity banned after repeated failures"
            );
        }
    }

    /// Number of envelope timestamps currently remembered.
    pub async fn seen_timestamp_count(&self) -> usize {
        self.state.lock().await.seen_timestamps.len()
    }
}

fn to_delta(duration: std::time::Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}
