// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Version/commit compatibility between a sender and this receiver.

/// Version string that marks a local or unreleased build.
pub const DEV_VERSION: &str = "dev";

/// Decide whether a client build may trigger this server.
///
/// - `dev` on either side is always compatible.
/// - Otherwise both versions (`vX.Y[.Z...]` or `X.Y[.Z...]`) must share
///   numeric major and minor.
/// - When the two version strings are textually identical, the commits must
///   match as well. The comparison is on the unstripped strings, so `1.0.0`
///   against `v1.0.0` does not enforce the commit check.
pub fn is_version_compatible(
    client_version: &str,
    server_version: &str,
    client_commit: &str,
    server_commit: &str,
) -> bool {
    if client_version == DEV_VERSION || server_version == DEV_VERSION {
        return true;
    }

    let (client_major, client_minor) = match major_minor(client_version) {
        Some(v) => v,
        None => return false,
    };
    let (server_major, server_minor) = match major_minor(server_version) {
        Some(v) => v,
        None => return false,
    };

    if client_major != server_major || client_minor != server_minor {
        return false;
    }

    if client_version == server_version && client_commit != server_commit {
        return false;
    }

    true
}

fn major_minor(version: &str) -> Option<(i64, i64)> {
    let stripped = version.strip_prefix('v').unwrap_or(version);
    let mut segments = stripped.split('.');
    let major = segments.next()?.parse().ok()?;
    let minor = segments.next()?.parse().ok()?;
    Some((major, minor))
}
