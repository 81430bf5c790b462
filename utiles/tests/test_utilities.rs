#![allow(unused)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

#[cfg(windows)]
pub const BINARY_NAME: &str = "utiles.exe";
#[cfg(not(windows))]
pub const BINARY_NAME: &str = "utiles";

/// Helper to get a temp output file path inside a fresh temp dir.
pub fn get_temp_output(filename: &str) -> (TempDir, PathBuf) {
	let dir = tempdir().expect("failed to create temp dir");
	let path = dir.path().join(filename);
	(dir, path)
}

/// Helper to create a `Command` for the `utiles` binary.
pub fn utiles_cmd() -> Command {
	Command::cargo_bin(BINARY_NAME).expect("failed to locate utiles binary")
}
