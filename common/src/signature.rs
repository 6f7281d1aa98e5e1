// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HMAC signatures over raw envelope bytes.
//!
//! Signatures travel as `<algorithm>:<lowercase-hex-mac>`. Only the
//! SHA-2 family is supported, and the receiver further restricts that to an
//! operator-configured allowlist. The MAC comparison is constant-time.

use crate::error::{AlgorithmError, SignatureError};
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

/// Supported HMAC hash functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Algorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Sha256, Algorithm::Sha384, Algorithm::Sha512];

    /// Wire name of the algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    fn mac_hex(&self, secret: &[u8], payload: &[u8]) -> Option<String> {
        let bytes = match self {
            Self::Sha256 => {
                let mut mac = HmacSha256::new_from_slice(secret).ok()?;
                mac.update(payload);
                mac.finalize().into_bytes().to_vec()
            }
            Self::Sha384 => {
                let mut mac = HmacSha384::new_from_slice(secret).ok()?;
                mac.update(payload);
                mac.finalize().into_bytes().to_vec()
            }
            Self::Sha512 => {
                let mut mac = HmacSha512::new_from_slice(secret).ok()?;
                mac.update(payload);
                mac.finalize().into_bytes().to_vec()
            }
        };
        Some(hex::encode(bytes))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = AlgorithmError;

    /// Names are matched exactly; `SHA256` is not `sha256`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            other => Err(AlgorithmError::Unsupported(other.to_string())),
        }
    }
}

/// Operator-configured subset of [`Algorithm`] accepted by the receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmSet(BTreeSet<Algorithm>);

impl AlgorithmSet {
    /// Build a set from explicit algorithms. An empty set is refused since it
    /// would reject every request.
    pub fn new(algorithms: impl IntoIterator<Item = Algorithm>) -> Result<Self, AlgorithmError> {
        let set: BTreeSet<Algorithm> = algorithms.into_iter().collect();
        if set.is_empty() {
            return Err(AlgorithmError::Empty);
        }
        Ok(Self(set))
    }

    /// All supported algorithms.
    pub fn all() -> Self {
        Self(Algorithm::ALL.into_iter().collect())
    }

    /// Parse a comma-separated list such as `sha256, sha512`.
    pub fn parse_list(list: &str) -> Result<Self, AlgorithmError> {
        let algorithms = list
            .split(',')
            .map(|name| name.trim().parse::<Algorithm>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(algorithms)
    }

    pub fn contains(&self, algorithm: Algorithm) -> bool {
        self.0.contains(&algorithm)
    }

    /// Case-sensitive membership test on a wire name.
    pub fn contains_name(&self, name: &str) -> bool {
        name.parse::<Algorithm>()
            .map(|algorithm| self.contains(algorithm))
            .unwrap_or(false)
    }

    /// Wire names in a stable order.
    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(Algorithm::as_str).collect()
    }
}

impl Default for AlgorithmSet {
    fn default() -> Self {
        Self::all()
    }
}

/// Compute `<algorithm>:<hex-mac>` of `payload` keyed by `secret`.
///
/// Returns `None` for any algorithm name outside the supported SHA-2 family.
pub fn generate_signature(payload: &[u8], secret: &str, algorithm: &str) -> Option<String> {
    let algorithm = algorithm.parse::<Algorithm>().ok()?;
    let mac = algorithm.mac_hex(secret.as_bytes(), payload)?;
    Some(format!("{}:{}", algorithm, mac))
}

/// Check a presented signature, reporting which step refused it.
pub fn check_signature(
    payload: &[u8],
    signature: &str,
    secret: &str,
    allowed: &AlgorithmSet,
) -> Result<(), SignatureError> {
    let (name, presented) = signature
        .split_once(':')
        .filter(|(name, mac)| !name.is_empty() && !mac.is_empty())
        .ok_or(SignatureError::Malformed)?;

    if !allowed.contains_name(name) {
        return Err(SignatureError::AlgorithmNotAllowed(name.to_string()));
    }

    let expected = generate_signature(payload, secret, name)
        .ok_or_else(|| SignatureError::AlgorithmNotAllowed(name.to_string()))?;
    let expected_mac = expected
        .split_once(':')
        .map(|(_, mac)| mac)
        .ok_or(SignatureError::BadMac)?;

    if bool::from(presented.as_bytes().ct_eq(expected_mac.as_bytes())) {
        Ok(())
    } else {
        Err(SignatureError::BadMac)
    }
}

/// Verify `signature` over `payload` using constant-time comparison.
pub fn verify_signature(
    payload: &[u8],
    signature: &str,
    secret: &str,
    allowed: &AlgorithmSet,
) -> bool {
    check_signature(payload, signature, secret, allowed).is_ok()
}
