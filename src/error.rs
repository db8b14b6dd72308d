//! Error types for safeio.
//!
//! All operations return `Result<T>` which aliases `Result<T, SafeIoError>`.
//!
//! Errors are latched by [`SafeFile`](crate::fs::SafeFile) and handed back on
//! every later call, so the type is `Clone` and keeps I/O errors behind an
//! `Arc`. Two values compare equal only when they carry the very same I/O
//! error, which is what "the same fault" means for a latched error.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors from transactional writes.
#[derive(Debug, Clone, Error)]
pub enum SafeIoError {
    /// Temporary file could not be created next to the destination.
    #[error("Failed to create temporary file for {path}: {source}")]
    Create {
        path: PathBuf,
        source: Arc<io::Error>,
    },

    /// Writing to the temporary file failed.
    ///
    /// Bytes already written stay in the temporary file until close
    /// discards the whole transaction.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: Arc<io::Error>,
    },

    /// Sync or rename failed during commit. The destination is untouched.
    #[error("Failed to commit {path}: {source}")]
    Commit {
        path: PathBuf,
        source: Arc<io::Error>,
    },

    /// Removing the temporary file of an aborted transaction failed.
    #[error("Failed to remove temporary file {path}: {source}")]
    Cleanup {
        path: PathBuf,
        source: Arc<io::Error>,
    },

    /// The input stream failed before all data was copied.
    #[error("Failed to read source: {source}")]
    SourceRead { source: Arc<io::Error> },

    /// Operation on a handle that was already closed.
    #[error("Handle for {0} is already closed")]
    Closed(PathBuf),

    /// Write on a handle whose content was already committed.
    #[error("Handle for {0} is already committed")]
    AlreadyCommitted(PathBuf),

    /// Permission mode could not be parsed.
    #[error("Invalid mode '{0}': {1}")]
    InvalidMode(String, String),

    /// Destination path is unusable.
    #[error("Invalid path '{0}': {1}")]
    InvalidPath(String, String),
}

impl SafeIoError {
    pub(crate) fn create(path: impl Into<PathBuf>, err: io::Error) -> Self {
        Self::Create {
            path: path.into(),
            source: Arc::new(err),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, err: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source: Arc::new(err),
        }
    }

    pub(crate) fn commit(path: impl Into<PathBuf>, err: io::Error) -> Self {
        Self::Commit {
            path: path.into(),
            source: Arc::new(err),
        }
    }

    pub(crate) fn cleanup(path: impl Into<PathBuf>, err: io::Error) -> Self {
        Self::Cleanup {
            path: path.into(),
            source: Arc::new(err),
        }
    }

    pub(crate) fn source_read(err: io::Error) -> Self {
        Self::SourceRead {
            source: Arc::new(err),
        }
    }

    /// Returns the underlying I/O error, if this failure came from the filesystem
    /// or the input stream.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::Create { source, .. }
            | Self::Write { source, .. }
            | Self::Commit { source, .. }
            | Self::Cleanup { source, .. }
            | Self::SourceRead { source } => Some(source),
            Self::Closed(_)
            | Self::AlreadyCommitted(_)
            | Self::InvalidMode(..)
            | Self::InvalidPath(..) => None,
        }
    }
}

impl PartialEq for SafeIoError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Create { path: a, source: x }, Self::Create { path: b, source: y })
            | (Self::Write { path: a, source: x }, Self::Write { path: b, source: y })
            | (Self::Commit { path: a, source: x }, Self::Commit { path: b, source: y })
            | (Self::Cleanup { path: a, source: x }, Self::Cleanup { path: b, source: y }) => {
                a == b && Arc::ptr_eq(x, y)
            }
            (Self::SourceRead { source: x }, Self::SourceRead { source: y }) => Arc::ptr_eq(x, y),
            (Self::Closed(a), Self::Closed(b)) => a == b,
            (Self::AlreadyCommitted(a), Self::AlreadyCommitted(b)) => a == b,
            (Self::InvalidMode(a, r), Self::InvalidMode(b, s))
            | (Self::InvalidPath(a, r), Self::InvalidPath(b, s)) => a == b && r == s,
            _ => false,
        }
    }
}

impl From<SafeIoError> for io::Error {
    fn from(err: SafeIoError) -> Self {
        let kind = match &err {
            SafeIoError::Closed(_) | SafeIoError::AlreadyCommitted(_) => io::ErrorKind::Other,
            SafeIoError::InvalidMode(..) | SafeIoError::InvalidPath(..) => {
                io::ErrorKind::InvalidInput
            }
            other => other
                .io_error()
                .map(io::Error::kind)
                .unwrap_or(io::ErrorKind::Other),
        };
        io::Error::new(kind, err)
    }
}

/// Result type alias for safeio operations.
pub type Result<T> = std::result::Result<T, SafeIoError>;
