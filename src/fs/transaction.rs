//! Transactional file handle.
//!
//! A [`SafeFile`] stages every write in a hidden temporary file next to the
//! destination and only exposes the result through an atomic rename on
//! [`SafeFile::commit`]. Closing without a commit removes the temporary file,
//! leaving the destination exactly as it was.
//!
//! ## Guarantees
//!
//! - **Atomicity**: The destination holds either its old content or the full new content
//! - **No leaks**: Close (explicit or on drop) removes an uncommitted temporary file
//! - **Sticky errors**: The first failure is latched and returned by every later call
//!
//! ## Lifecycle
//!
//! 1. **Open**: Create the temporary file with the requested mode
//! 2. **Write**: Append bytes to the temporary file
//! 3. **Commit**: Sync, then rename onto the destination (at most once)
//! 4. **Close**: Release the file; discard it if it was never committed
//!
//! ## Example
//!
//! ```no_run
//! # use safeio::fs::SafeFile;
//! # fn example() -> safeio::Result<()> {
//! let mut file = SafeFile::open("settings.json", 0o644)?;
//!
//! file.write_all(b"{\"theme\": \"dark\"}\n")?;
//! file.commit()?;
//!
//! file.close()?; // Reports any error latched earlier
//! # Ok(())
//! # }
//! ```

use super::options::Options;
use super::temp;
use crate::error::{Result, SafeIoError};

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Where a handle is in its open → commit → close lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransactionState {
    /// Accepting writes.
    Writing,
    /// Renamed into place.
    Committed,
}

/// Write target that becomes visible at its destination only on commit.
///
/// Operations are sequential; the handle does no internal locking. Two
/// handles for the same destination are not coordinated: the last rename wins.
#[must_use = "SafeFile must be committed and closed"]
#[derive(Debug)]
pub struct SafeFile {
    path: PathBuf,
    temp_path: PathBuf,
    options: Options,
    file: Option<File>,
    state: TransactionState,
    err: Option<SafeIoError>,
    closed: Option<Result<()>>,
    written: u64,
}

impl SafeFile {
    /// Opens a transactional handle for `path` with the given permission bits.
    ///
    /// The parent directory must already exist.
    pub fn open(path: impl AsRef<Path>, mode: u32) -> Result<Self> {
        Self::open_with(path, &Options::new(mode))
    }

    /// Opens a transactional handle for `path` using explicit [`Options`].
    pub fn open_with(path: impl AsRef<Path>, options: &Options) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let (file, temp_path) = temp::create_temp(&path, options.mode(), options.attempts())?;

        log::debug!(
            "Staging {} in {}",
            path.display(),
            temp_path.display()
        );

        Ok(Self {
            path,
            temp_path,
            options: options.clone(),
            file: Some(file),
            state: TransactionState::Writing,
            err: None,
            closed: None,
            written: 0,
        })
    }

    /// Destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Temporary path holding the staged content until commit.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Permission bits the file was created with.
    pub fn mode(&self) -> u32 {
        self.options.mode()
    }

    /// Total bytes accepted by successful writes.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Returns true once the content has been renamed into place.
    pub fn is_committed(&self) -> bool {
        self.state == TransactionState::Committed
    }

    /// Returns true once close has run, explicitly or on drop.
    pub fn is_closed(&self) -> bool {
        self.closed.is_some()
    }

    /// The latched error, if any operation has failed.
    pub fn error(&self) -> Option<&SafeIoError> {
        self.err.as_ref()
    }

    /// Writes `buf` to the temporary file.
    ///
    /// Returns the number of bytes the file accepted, which may be short.
    /// A failure is latched: this and every later write, commit and close
    /// return it, and no further I/O happens. Bytes written before the
    /// failure stay in the temporary file until close discards it.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.ensure_writable()?;
        let Some(file) = self.file.as_mut() else {
            return Err(SafeIoError::Closed(self.path.clone()));
        };

        let result = loop {
            match file.write(buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => break other,
            }
        };

        match result {
            Ok(n) => {
                self.written += n as u64;
                Ok(n)
            }
            Err(e) => {
                let err = SafeIoError::write(&self.path, e);
                Err(self.latch(err))
            }
        }
    }

    /// Writes all of `buf`, looping over short writes.
    pub fn write_all(&mut self, mut buf: &[u8]) -> Result<()> {
        while !buf.is_empty() {
            match self.write(buf)? {
                0 => {
                    let err = SafeIoError::write(
                        &self.path,
                        io::Error::from(io::ErrorKind::WriteZero),
                    );
                    return Err(self.latch(err));
                }
                n => buf = &buf[n..],
            }
        }
        Ok(())
    }

    /// Makes the staged content visible at the destination.
    ///
    /// Syncs the temporary file (unless disabled) and renames it over the
    /// destination, replacing any existing file. Calling commit again after
    /// success is a no-op. On failure the error is latched and the
    /// destination is left untouched; close still removes the temporary file.
    pub fn commit(&mut self) -> Result<()> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        if self.state == TransactionState::Committed {
            return Ok(());
        }
        let Some(file) = self.file.as_mut() else {
            return Err(SafeIoError::Closed(self.path.clone()));
        };

        if self.options.syncs_on_commit() {
            if let Err(e) = file.sync_all() {
                let err = SafeIoError::commit(&self.path, e);
                return Err(self.latch(err));
            }
        }

        if let Err(e) = fs::rename(&self.temp_path, &self.path) {
            let err = SafeIoError::commit(&self.path, e);
            return Err(self.latch(err));
        }

        self.state = TransactionState::Committed;
        log::debug!("Committed: {}", self.path.display());

        if self.options.syncs_parent_dir() {
            let dir = temp::parent_dir(&self.path);
            if let Err(e) = temp::fsync_dir(dir) {
                log::warn!("Failed to sync directory {}: {}", dir.display(), e);
            }
        }

        Ok(())
    }

    /// Releases the handle.
    ///
    /// Without a prior commit the temporary file is removed and the
    /// destination is untouched. Returns the latched error if any operation
    /// failed, otherwise any cleanup failure. Only the first call does
    /// anything; later calls return the same outcome.
    pub fn close(&mut self) -> Result<()> {
        if let Some(outcome) = &self.closed {
            return outcome.clone();
        }

        drop(self.file.take());

        if self.state != TransactionState::Committed {
            match fs::remove_file(&self.temp_path) {
                Ok(()) => log::debug!("Discarded: {}", self.temp_path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::debug!("Temporary file already gone: {}", self.temp_path.display());
                }
                Err(e) => {
                    log::error!("Failed to remove {}: {}", self.temp_path.display(), e);
                    let err = SafeIoError::cleanup(&self.temp_path, e);
                    self.latch(err);
                }
            }
        }

        let outcome = match &self.err {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        };
        self.closed = Some(outcome.clone());
        outcome
    }

    /// Latches `err` as if the underlying storage had failed.
    #[cfg(any(test, feature = "fault_injection"))]
    pub fn inject_fault(&mut self, err: SafeIoError) {
        self.latch(err);
    }

    /// Records the first error; later ones are dropped in its favor.
    fn latch(&mut self, err: SafeIoError) -> SafeIoError {
        self.err.get_or_insert(err).clone()
    }

    fn ensure_writable(&self) -> Result<()> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        if self.closed.is_some() {
            return Err(SafeIoError::Closed(self.path.clone()));
        }
        if self.state == TransactionState::Committed {
            return Err(SafeIoError::AlreadyCommitted(self.path.clone()));
        }
        Ok(())
    }
}

impl Write for SafeFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        SafeFile::write(self, buf).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(err) = &self.err {
            return Err(err.clone().into());
        }
        let Some(file) = self.file.as_mut() else {
            return Err(SafeIoError::Closed(self.path.clone()).into());
        };
        if let Err(e) = file.flush() {
            let err = SafeIoError::write(&self.path, e);
            return Err(self.latch(err).into());
        }
        Ok(())
    }
}

impl Drop for SafeFile {
    fn drop(&mut self) {
        if self.closed.is_some() {
            return;
        }
        if self.state != TransactionState::Committed {
            log::warn!(
                "SafeFile dropped without commit, discarding: {}",
                self.path.display()
            );
        }
        if let Err(e) = self.close() {
            log::debug!("Close on drop reported: {}", e);
        }
    }
}
