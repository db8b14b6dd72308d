use crate::error::{Result, SafeIoError};
use std::path::Path;

/// Largest accepted mode: permission bits plus setuid/setgid/sticky.
const MAX_MODE: u32 = 0o7777;

/// Parses an octal permission string such as `644`, `0644` or `0o644`.
pub fn parse_mode(input: &str) -> Result<u32> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0o")
        .or_else(|| trimmed.strip_prefix("0O"))
        .unwrap_or(trimmed);

    if digits.is_empty() {
        return Err(SafeIoError::InvalidMode(
            input.to_string(),
            "cannot be empty".to_string(),
        ));
    }

    if !digits.chars().all(|c| ('0'..='7').contains(&c)) {
        return Err(SafeIoError::InvalidMode(
            input.to_string(),
            "must be an octal number".to_string(),
        ));
    }

    let mode = u32::from_str_radix(digits, 8).map_err(|e| {
        SafeIoError::InvalidMode(input.to_string(), e.to_string())
    })?;

    if mode > MAX_MODE {
        return Err(SafeIoError::InvalidMode(
            input.to_string(),
            format!("exceeds maximum of {:o}", MAX_MODE),
        ));
    }

    Ok(mode)
}

/// Checks that `dest` can be the target of a transactional write.
///
/// The parent directory must exist, and the destination itself must not be
/// a directory (a rename could never replace it).
pub fn validate_destination(dest: &Path) -> Result<()> {
    let display = dest.display().to_string();

    if dest.file_name().is_none() {
        return Err(SafeIoError::InvalidPath(
            display,
            "must name a file".to_string(),
        ));
    }

    if dest.is_dir() {
        return Err(SafeIoError::InvalidPath(
            display,
            "is a directory".to_string(),
        ));
    }

    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        log::debug!("Missing parent directory: {}", parent.display());
        return Err(SafeIoError::InvalidPath(
            display,
            format!("parent directory {} does not exist", parent.display()),
        ));
    }

    Ok(())
}
