//! Atomic file copy into the template.
//!
//! ## `copy_file` protocol
//!
//! 1. Ensure the destination's parent directory exists.
//! 2. Copy the source bytes (and permission bits) to `<dest>.stencil.tmp`.
//! 3. Rename the temporary file over the destination (atomic on POSIX).
//! 4. On rename failure, remove the temporary file and leave the original.

use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

/// Suffix appended to the destination path for the in-flight copy.
pub const TMP_SUFFIX: &str = ".stencil.tmp";

/// Copy `source` over `dest`, creating parent directories as needed.
///
/// Returns the number of bytes copied.
pub fn copy_file(source: &Path, dest: &Path) -> Result<u64, SyncError> {
    let tmp = tmp_path(dest);
    copy_file_with_tmp(source, dest, &tmp)
}

fn tmp_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(TMP_SUFFIX);
    PathBuf::from(name)
}

fn copy_file_with_tmp(source: &Path, dest: &Path, tmp: &Path) -> Result<u64, SyncError> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }

    // fs::copy carries the permission bits over as well.
    let bytes = match std::fs::copy(source, tmp) {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = std::fs::remove_file(tmp);
            return Err(io_err(source, e));
        }
    };

    if let Err(e) = std::fs::rename(tmp, dest) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(dest, e));
    }

    tracing::debug!(
        source = %source.display(),
        dest = %dest.display(),
        bytes,
        "copied file"
    );
    Ok(bytes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
