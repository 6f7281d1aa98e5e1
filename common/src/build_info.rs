// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Build metadata baked in at compile time.

use crate::compat::DEV_VERSION;

/// Version and commit of this build.
///
/// Set `DCHOOK_VERSION` and `DCHOOK_COMMIT` in the build environment for
/// release builds; unset they default to `dev` and `unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
}

impl BuildInfo {
    pub const fn current() -> Self {
        Self {
            version: match option_env!("DCHOOK_VERSION") {
                Some(v) => v,
                None => DEV_VERSION,
            },
            commit: match option_env!("DCHOOK_COMMIT") {
                Some(c) => c,
                None => "unknown",
            },
        }
    }
}

