//! Shared helpers for the event log integration tests

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Write `contents` to `name` inside `dir` and return the full path
pub fn write_log(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write test log");
    path
}

/// Event word whose decoded address is `address` (positive polarity)
pub fn event_word(address: u32) -> u32 {
    (address << 1) | 1
}
