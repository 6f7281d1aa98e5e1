// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Webhook secret loading.

use crate::error::StartupError;
use std::fs;
use std::path::Path;

/// Read the shared secret, trimming surrounding whitespace.
///
/// On Unix the file must be a regular file readable only by its owner
/// (mode 600 or 400), or a named pipe such as a process substitution.
pub fn load_secret(path: &Path) -> Result<String, StartupError> {
    check_file_type(path)?;

    let raw = fs::read_to_string(path).map_err(|source| StartupError::SecretRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(raw.trim().to_string())
}

#[cfg(unix)]
fn check_file_type(path: &Path) -> Result<(), StartupError> {
    use std::os::unix::fs::{FileTypeExt, PermissionsExt};

    let metadata = fs::metadata(path).map_err(|source| StartupError::SecretRead {
        path: path.to_path_buf(),
        source,
    })?;
    let file_type = metadata.file_type();

    if file_type.is_file() {
        let mode = metadata.permissions().mode() & 0o777;
        if mode != 0o600 && mode != 0o400 {
            return Err(StartupError::InsecureSecretPermissions { mode });
        }
        Ok(())
    } else if file_type.is_fifo() {
        Ok(())
    } else {
        Err(StartupError::SecretNotRegular(path.to_path_buf()))
    }
}

#[cfg(not(unix))]
fn check_file_type(_path: &Path) -> Result<(), StartupError> {
    Ok(())
}
