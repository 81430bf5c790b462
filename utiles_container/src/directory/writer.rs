//! Writes tiles into a `<z>/<x>/<y>.<ext>` directory pyramid and maintains
//! the sibling `metadata.json`.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use utiles_core::{Tile, TileFormat};

/// A handle on a directory-pyramid tile destination.
pub struct DirectoryWriter {
	root: PathBuf,
}

impl DirectoryWriter {
	#[must_use]
	pub fn new(root: PathBuf) -> Self {
		Self { root }
	}

	#[must_use]
	pub fn root(&self) -> &PathBuf {
		&self.root
	}

	/// Write one tile, creating its `<z>/<x>/` directories as needed.
	pub fn write_tile(&self, tile: Tile, data: &[u8], format: TileFormat) -> Result<()> {
		let dir = self.root.join(tile.z.to_string()).join(tile.x.to_string());
		fs::create_dir_all(&dir).with_context(|| format!("creating {dir:?}"))?;
		let path = dir.join(format!("{}.{}", tile.y, format.extension()));
		fs::write(&path, data).with_context(|| format!("writing {path:?}"))
	}

	/// Write (or overwrite) the sibling `metadata.json`.
	pub fn write_metadata(&self, metadata: &serde_json::Value) -> Result<()> {
		fs::create_dir_all(&self.root)?;
		let path = self.root.join("metadata.json");
		let text = serde_json::to_string_pretty(metadata)?;
		fs::write(path, text)?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::tempdir;

	#[test]
	fn write_tile_creates_expected_path() {
		let dir = tempdir().unwrap();
		let writer = DirectoryWriter::new(dir.path().to_path_buf());
		writer.write_tile(Tile::new(5, 6, 7).unwrap(), b"abc", TileFormat::Jpg).unwrap();
		assert!(dir.path().join("7/5/6.jpg").exists());
	}

	#[test]
	fn write_metadata_roundtrips() {
		let dir = tempdir().unwrap();
		let writer = DirectoryWriter::new(dir.path().to_path_buf());
		writer.write_metadata(&serde_json::json!({"name": "test"})).unwrap();
		let text = fs::read_to_string(dir.path().join("metadata.json")).unwrap();
		assert!(text.contains("\"name\""));
	}
}
