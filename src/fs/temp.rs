//! Temporary file allocation next to the destination.
//!
//! The temporary file lives in the destination's directory so the final
//! rename stays on one filesystem. Names carry the process id, a timestamp
//! and a process-wide counter; creation is exclusive, and a name that is
//! already taken is replaced by a fresh one a bounded number of times.

use crate::error::{Result, SafeIoError};

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Creates an empty temporary file for `dest` with the given mode.
///
/// Returns the open file and its path.
pub(crate) fn create_temp(dest: &Path, mode: u32, attempts: u32) -> Result<(File, PathBuf)> {
    create_temp_with(dest, mode, attempts, temp_name)
}

/// Like [`create_temp`], drawing candidate names from `next_name`.
pub(crate) fn create_temp_with<F>(
    dest: &Path,
    mode: u32,
    attempts: u32,
    mut next_name: F,
) -> Result<(File, PathBuf)>
where
    F: FnMut(&OsStr) -> String,
{
    let file_name = dest.file_name().ok_or_else(|| {
        SafeIoError::create(
            dest,
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "destination has no file name component",
            ),
        )
    })?;
    let dir = parent_dir(dest);

    let mut last_err = None;
    for _ in 0..attempts {
        let candidate = dir.join(next_name(file_name));
        match open_exclusive(&candidate, mode) {
            Ok(file) => {
                apply_mode(&file, mode).map_err(|e| {
                    if let Err(rm) = fs::remove_file(&candidate) {
                        log::warn!("Failed to remove {}: {}", candidate.display(), rm);
                    }
                    SafeIoError::create(dest, e)
                })?;
                return Ok((file, candidate));
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                log::debug!("Temporary name taken, retrying: {}", candidate.display());
                last_err = Some(e);
            }
            Err(e) => return Err(SafeIoError::create(dest, e)),
        }
    }

    let err = last_err.unwrap_or_else(|| io::Error::from(io::ErrorKind::AlreadyExists));
    Err(SafeIoError::create(dest, err))
}

/// Directory that holds `path`; a bare file name resolves to `.`.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn temp_name(file_name: &OsStr) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

    format!(
        ".{}.{}-{}-{}.tmp",
        file_name.to_string_lossy(),
        std::process::id(),
        nanos,
        counter
    )
}

#[cfg(unix)]
fn open_exclusive(path: &Path, mode: u32) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(mode)
        .open(path)
}

#[cfg(not(unix))]
fn open_exclusive(path: &Path, _mode: u32) -> io::Result<File> {
    fs::OpenOptions::new().write(true).create_new(true).open(path)
}

/// Sets the exact permission bits; creation alone is subject to the umask.
#[cfg(unix)]
fn apply_mode(file: &File, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn apply_mode(_file: &File, _mode: u32) -> io::Result<()> {
    Ok(())
}

/// Flushes directory metadata so a completed rename survives a crash.
#[cfg(unix)]
pub(crate) fn fsync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
pub(crate) fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
