//! Shared helpers for safeio integration tests.

use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::Path;

pub const DATA: &[u8] = b"hello world\n";

/// Names of all entries in `dir`, sorted.
#[allow(unused)]
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Permission bits of `path` (Unix only).
#[cfg(unix)]
#[allow(unused)]
pub fn mode_of(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).unwrap().permissions().mode() & 0o7777
}

/// Helper to run a write command
#[allow(unused)]
pub fn run_write(dest: &Path, stdin: &[u8], extra_args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = cargo_bin_cmd!("safeio");
    cmd.arg("write").arg(dest).args(extra_args).write_stdin(stdin.to_vec());

    cmd.assert()
}
