// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request generators for end-to-end and attack tests.

use chrono::Utc;
use dchook_common::{generate_signature, BuildInfo, Envelope};
use serde_json::{json, Value};
use std::net::{IpAddr, Ipv4Addr};

pub const SECRET: &str = "harness-webhook-secret";

pub const SERVER_BUILD: BuildInfo = BuildInfo {
    version: "v2.1.0",
    commit: "feedface",
};

/// Same major.minor as the server, different patch: commit is not checked.
pub const CLIENT_VERSION: &str = "v2.1.4";
pub const CLIENT_COMMIT: &str = "c0ffee";

/// Generate a pool of client addresses.
///
/// Uses the 198.18.0.0/15 benchmarking range so none of them look like a
/// trusted proxy.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            let a = 18 + ((i >> 16) & 0x1) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(198, a, b, c))
        })
        .collect()
}

pub fn now_micros() -> i64 {
    Utc::now().timestamp_micros()
}

/// Serialize and sign an envelope with the shared secret.
pub fn signed_envelope(
    version: &str,
    commit: &str,
    timestamp: i64,
    payload: Value,
    algorithm: &str,
) -> (Vec<u8>, String) {
    let body = Envelope::new(version, commit, timestamp, payload)
        .to_vec()
        .unwrap();
    let signature = generate_signature(&body, SECRET, algorithm).unwrap();
    (body, signature)
}

/// A valid request with a fresh, unique timestamp.
pub fn fresh_request(seq: i64) -> (Vec<u8>, String) {
    signed_envelope(
        CLIENT_VERSION,
        CLIENT_COMMIT,
        now_micros() + seq,
        json!({"image": "app:latest", "seq": seq}),
        "sha256",
    )
}

/// A correctly signed request whose timestamp is `age_secs` in the past.
pub fn stale_request(age_secs: i64) -> (Vec<u8>, String) {
    signed_envelope(
        CLIENT_VERSION,
        CLIENT_COMMIT,
        now_micros() - age_secs * 1_000_000,
        json!({"image": "app:latest"}),
        "sha256",
    )
}

/// A well-formed envelope carrying a guessed MAC.
pub fn forged_request(seq: usize) -> (Vec<u8>, String) {
    let body = Envelope::new(CLIENT_VERSION, CLIENT_COMMIT, now_micros(), json!({}))
        .to_vec()
        .unwrap();
    let guess = format!("{:064x}", seq as u128 * 0x9e37_79b9_7f4a_7c15);
    (body, format!("sha256:{}", guess))
}

/// Signature header variants that must never authenticate.
pub fn malformed_signatures() -> Vec<&'static str> {
    vec![
        "",
        "sha256",
        "sha256:",
        ":deadbeef",
        "md5:d41d8cd98f00b204e9800998ecf8427e",
        "SHA256:00",
        "sha1:da39a3ee5e6b4b0d3255bfef95601890afd80709",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ips_unique_and_public() {
        let ips = generate_ips(600);
        let unique: std::collections::HashSet<_> = ips.iter().collect();
        assert_eq!(unique.len(), 600);
        assert!(ips.iter().all(|ip| match ip {
            IpAddr::V4(v4) => !v4.is_private() && !v4.is_loopback(),
            IpAddr::V6(_) => false,
        }));
    }
}
