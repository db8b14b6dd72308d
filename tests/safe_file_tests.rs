mod common;

use std::fs;
use std::io::{self, Write};

use common::*;
use safeio::{SafeFile, SafeIoError};
use tempfile::TempDir;

#[test]
fn test_commit_publishes_exact_content() {
    let temp = TempDir::new().unwrap();
    let name = temp.path().join("test1.txt");

    let mut f = SafeFile::open(&name, 0o644).unwrap();
    assert_eq!(f.write(DATA).unwrap(), 12);
    f.commit().unwrap();
    f.close().unwrap();

    assert_eq!(fs::read(&name).unwrap(), DATA);
    assert_eq!(dir_entries(temp.path()), vec!["test1.txt"]);
}

#[test]
fn test_nothing_visible_before_commit() {
    let temp = TempDir::new().unwrap();
    let name = temp.path().join("test1.txt");

    let mut f = SafeFile::open(&name, 0o644).unwrap();
    f.write_all(DATA).unwrap();

    // Only the hidden temporary file exists until commit.
    let entries = dir_entries(temp.path());
    assert_eq!(entries.len(), 1);
    assert!(entries[0].starts_with(".test1.txt."));
    assert!(!name.exists());

    f.commit().unwrap();
    assert_eq!(dir_entries(temp.path()), vec!["test1.txt"]);
    f.close().unwrap();
}

#[test]
fn test_elective_abort() {
    let temp = TempDir::new().unwrap();
    let name = temp.path().join("test1.txt");

    let mut f = SafeFile::open(&name, 0o644).unwrap();
    f.write_all(DATA).unwrap();
    f.close().unwrap();

    assert_eq!(fs::read(&name).unwrap_err().kind(), io::ErrorKind::NotFound);
    assert!(dir_entries(temp.path()).is_empty());
}

#[test]
fn test_abort_for_various_sizes() {
    for size in [0usize, 1, 4096, 100_000] {
        let temp = TempDir::new().unwrap();
        let name = temp.path().join("blob.bin");
        let data = vec![0xAB; size];

        let mut f = SafeFile::open(&name, 0o644).unwrap();
        f.write_all(&data).unwrap();
        f.close().unwrap();

        assert!(!name.exists(), "size {}", size);
        assert!(dir_entries(temp.path()).is_empty(), "size {}", size);
    }
}

#[test]
fn test_replace_keeps_old_content_until_commit() {
    let temp = TempDir::new().unwrap();
    let name = temp.path().join("state.json");
    fs::write(&name, "{\"v\":1}").unwrap();

    let mut f = SafeFile::open(&name, 0o644).unwrap();
    write!(f, "{{\"v\":2}}").unwrap();
    assert_eq!(fs::read_to_string(&name).unwrap(), "{\"v\":1}");

    f.commit().unwrap();
    f.close().unwrap();

    assert_eq!(fs::read_to_string(&name).unwrap(), "{\"v\":2}");
    assert_eq!(dir_entries(temp.path()), vec!["state.json"]);
}

#[cfg(unix)]
#[test]
fn test_mode_reaches_destination() {
    let temp = TempDir::new().unwrap();

    for mode in [0o644, 0o600, 0o640, 0o755] {
        let name = temp.path().join(format!("file-{:o}", mode));
        let mut f = SafeFile::open(&name, mode).unwrap();
        f.write_all(DATA).unwrap();
        f.commit().unwrap();
        f.close().unwrap();

        assert_eq!(mode_of(&name), mode);
    }
}

#[cfg(unix)]
#[test]
fn test_commit_failure_repeats_until_close() {
    let temp = TempDir::new().unwrap();
    let name = temp.path().join("busy");
    fs::create_dir(&name).unwrap();
    fs::write(name.join("inner"), "x").unwrap();

    let mut f = SafeFile::open(&name, 0o644).unwrap();
    f.write_all(DATA).unwrap();

    let err = f.commit().unwrap_err();
    assert!(matches!(err, SafeIoError::Commit { .. }));
    assert_eq!(f.write(DATA), Err(err.clone()));
    assert_eq!(f.close(), Err(err.clone()));
    assert_eq!(f.close(), Err(err));

    assert_eq!(dir_entries(temp.path()), vec!["busy"]);
}

#[test]
fn test_scope_exit_cleans_up() {
    let temp = TempDir::new().unwrap();
    let name = temp.path().join("test1.txt");

    let result: safeio::Result<()> = (|| {
        let mut f = SafeFile::open(&name, 0o644)?;
        f.write_all(DATA)?;
        Err(SafeIoError::InvalidPath(
            "test1.txt".into(),
            "caller bailed out".into(),
        ))
    })();

    assert!(result.is_err());
    assert!(!name.exists());
    assert!(dir_entries(temp.path()).is_empty());
}
