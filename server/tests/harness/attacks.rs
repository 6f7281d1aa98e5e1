// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Attack patterns against the deploy endpoint.

/// What each simulated request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackKind {
    /// Well-formed envelopes with guessed MACs
    ForgedSignature,
    /// One captured valid request sent again and again
    Replay,
    /// Validly signed requests captured long ago
    StaleCapture,
    /// Valid, fresh requests sent faster than the success limit allows
    LegitimateBurst,
}

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Number of unique client addresses, used round-robin
    pub unique_ips: usize,
    pub kind: AttackKind,
}

/// Predefined attack patterns.
impl AttackConfig {
    /// Secret guessing from a single address.
    pub fn single_ip_forgery() -> Self {
        Self {
            total_requests: 100,
            unique_ips: 1,
            kind: AttackKind::ForgedSignature,
        }
    }

    /// Secret guessing spread over many addresses.
    pub fn distributed_forgery() -> Self {
        Self {
            total_requests: 500,
            unique_ips: 100,
            kind: AttackKind::ForgedSignature,
        }
    }

    /// A sniffed request replayed from many addresses.
    pub fn replay_storm() -> Self {
        Self {
            total_requests: 50,
            unique_ips: 50,
            kind: AttackKind::Replay,
        }
    }

    /// Old captured requests, one per address.
    pub fn stale_capture() -> Self {
        Self {
            total_requests: 30,
            unique_ips: 30,
            kind: AttackKind::StaleCapture,
        }
    }

    /// A legitimate sender stuck in a retry loop.
    pub fn legitimate_burst() -> Self {
        Self {
            total_requests: 40,
            unique_ips: 1,
            kind: AttackKind::LegitimateBurst,
        }
    }
}
