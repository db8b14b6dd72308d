//! Stream-copy helpers built on [`SafeFile`].
//!
//! Each helper opens a handle, pumps the data in, commits, and always
//! closes. Either the whole input lands at the destination or the
//! destination is left as it was.

use crate::error::{Result, SafeIoError};
use crate::fs::{Options, SafeFile};

use std::io::{self, Read};
use std::path::Path;

const CHUNK_SIZE: usize = 32 * 1024;

/// Copies everything from `source` into `path`, committing atomically.
///
/// Returns the number of bytes copied. On any failure (reading the source,
/// writing, or committing) the destination is untouched and the error is
/// returned.
pub fn write_to_file<R: Read>(source: R, path: impl AsRef<Path>, mode: u32) -> Result<u64> {
    write_to_file_with(source, path, &Options::new(mode))
}

/// Like [`write_to_file`], with explicit [`Options`].
pub fn write_to_file_with<R: Read>(
    mut source: R,
    path: impl AsRef<Path>,
    options: &Options,
) -> Result<u64> {
    let mut file = SafeFile::open_with(path, options)?;

    let outcome = pump(&mut source, &mut file).and_then(|copied| {
        file.commit()?;
        Ok(copied)
    });
    let closed = file.close();

    match outcome {
        Ok(copied) => {
            closed?;
            log::info!("Wrote {} bytes to {}", copied, file.path().display());
            Ok(copied)
        }
        Err(e) => {
            log::debug!("Aborted write to {}: {}", file.path().display(), e);
            Err(e)
        }
    }
}

/// Writes `data` to `path` in one transaction.
pub fn write_file(path: impl AsRef<Path>, data: impl AsRef<[u8]>, mode: u32) -> Result<()> {
    write_to_file(data.as_ref(), path, mode).map(|_| ())
}

fn pump<R: Read>(source: &mut R, file: &mut SafeFile) -> Result<u64> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut copied = 0u64;

    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => return Ok(copied),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(SafeIoError::source_read(e)),
        };

        file.write_all(&buf[..n])?;
        copied += n as u64;
    }
}
