//! `<z>/<x>/<y>.<ext>` directory-pyramid tile storage, with a sibling
//! `metadata.json`.

mod reader;
mod writer;

pub use reader::DirectoryReader;
pub use writer::DirectoryWriter;

use anyhow::Result;
use std::path::Path;

/// Recursively remove a directory tree. A thin, named wrapper around
/// `fs::remove_dir_all` so the CLI's `rimraf` command reads as a deliberate
/// tile-pyramid operation rather than a raw filesystem call.
pub fn rimraf(path: &Path) -> Result<()> {
	if path.exists() {
		std::fs::remove_dir_all(path)?;
	}
	Ok(())
}
