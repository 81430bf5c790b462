//! Reads tiles out of a `<z>/<x>/<y>.<ext>` directory pyramid, with format
//! classification left to the filename extension (directories are trusted
//! to be consistent; `utiles_core::sniff` is used only as a fallback when
//! the extension is missing or unrecognized).

use anyhow::{ensure, Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use utiles_core::{Tile, TileFormat, TileType};

/// A handle on a directory-pyramid tile source.
pub struct DirectoryReader {
	root: PathBuf,
	tile_map: BTreeMap<Tile, PathBuf>,
}

impl DirectoryReader {
	/// Open a directory and index every `<z>/<x>/<y>.<ext>` file beneath
	/// it. `metadata.json` and any other non-numeric entries are skipped.
	pub fn open(root: &Path) -> Result<Self> {
		ensure!(root.exists(), "directory {root:?} does not exist");
		ensure!(root.is_dir(), "{root:?} is not a directory");

		let mut tile_map = BTreeMap::new();
		for z_entry in read_numeric_dirs(root)? {
			let z: u8 = z_entry
				.file_name()
				.and_then(|n| n.to_str())
				.and_then(|n| n.parse().ok())
				.context("invalid zoom directory name")?;
			for x_entry in read_numeric_dirs(&z_entry)? {
				let x: u32 = x_entry
					.file_name()
					.and_then(|n| n.to_str())
					.and_then(|n| n.parse().ok())
					.context("invalid x directory name")?;
				for file in fs::read_dir(&x_entry)? {
					let file = file?;
					let path = file.path();
					if !path.is_file() {
						continue;
					}
					if let Some(y) = parse_y(&path) {
						if let Ok(tile) = Tile::new(x, y, z) {
							tile_map.insert(tile, path);
						}
					}
				}
			}
		}

		Ok(Self {
			root: root.to_path_buf(),
			tile_map,
		})
	}

	#[must_use]
	pub fn root(&self) -> &Path {
		&self.root
	}

	#[must_use]
	pub fn tile_count(&self) -> usize {
		self.tile_map.len()
	}

	/// Read a single tile's raw bytes, if present.
	pub fn get_tile(&self, tile: Tile) -> Result<Option<Vec<u8>>> {
		match self.tile_map.get(&tile) {
			Some(path) => Ok(Some(fs::read(path)?)),
			None => Ok(None),
		}
	}

	/// Every tile in the pyramid, in canonical `(z, y, x)` order.
	pub fn all_tiles(&self) -> Result<Vec<(Tile, Vec<u8>)>> {
		self.tile_map
			.iter()
			.map(|(t, p)| Ok((*t, fs::read(p)?)))
			.collect()
	}

	/// Stream tiles out of the pyramid one file at a time. The index
	/// (`tile_map`) is already in memory, so unlike the MBTiles reader this
	/// needs no background thread: each file is only read when the caller
	/// asks for the next item.
	pub fn iter_tiles(&self) -> impl Iterator<Item = Result<(Tile, Vec<u8>, TileType)>> + '_ {
		self.tile_map.iter().map(|(t, p)| {
			let data = fs::read(p)?;
			let mut tile_type = utiles_core::sniff(&data);
			tile_type.format = format_for(p, &data);
			Ok((*t, data, tile_type))
		})
	}

	/// Parse the sibling `metadata.json`, if present.
	pub fn metadata(&self) -> Result<Option<serde_json::Value>> {
		let path = self.root.join("metadata.json");
		if !path.exists() {
			return Ok(None);
		}
		let text = fs::read_to_string(&path)?;
		Ok(Some(serde_json::from_str(&text)?))
	}
}

fn read_numeric_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
	let mut out = Vec::new();
	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();
		if path.is_dir() {
			if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
				if name.chars().all(|c| c.is_ascii_digit()) {
					out.push(path);
				}
			}
		}
	}
	Ok(out)
}

/// Parse the `y` component out of a `<y>.<ext>` filename.
fn parse_y(path: &Path) -> Option<u32> {
	let stem = path.file_stem()?.to_str()?;
	stem.parse().ok()
}

/// Best-effort format for a stored tile file, preferring the extension and
/// falling back to signature sniffing.
#[must_use]
pub fn format_for(path: &Path, data: &[u8]) -> TileFormat {
	match path.extension().and_then(|e| e.to_str()) {
		Some("png") => TileFormat::Png,
		Some("jpg" | "jpeg") => TileFormat::Jpg,
		Some("gif") => TileFormat::Gif,
		Some("webp") => TileFormat::Webp,
		Some("pbf" | "mvt") => TileFormat::Pbf,
		Some("json") => TileFormat::Json,
		_ => utiles_core::sniff(data).format,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::directory::writer::DirectoryWriter;
	use tempfile::tempdir;

	#[test]
	fn indexes_written_tiles() {
		let dir = tempdir().unwrap();
		let writer = DirectoryWriter::new(dir.path().to_path_buf());
		writer.write_tile(Tile::new(1, 2, 3).unwrap(), b"data", TileFormat::Png).unwrap();

		let reader = DirectoryReader::open(dir.path()).unwrap();
		assert_eq!(reader.tile_count(), 1);
		let data = reader.get_tile(Tile::new(1, 2, 3).unwrap()).unwrap().unwrap();
		assert_eq!(data, b"data");
	}

	#[test]
	fn missing_metadata_is_none() {
		let dir = tempdir().unwrap();
		fs::create_dir_all(dir.path().join("0/0")).unwrap();
		let reader = DirectoryReader::open(dir.path()).unwrap();
		assert!(reader.metadata().unwrap().is_none());
	}

	#[test]
	fn iter_tiles_yields_the_same_rows_as_all_tiles() {
		let dir = tempdir().unwrap();
		let writer = DirectoryWriter::new(dir.path().to_path_buf());
		writer.write_tile(Tile::new(1, 2, 3).unwrap(), b"data", TileFormat::Png).unwrap();
		writer.write_tile(Tile::new(0, 0, 1).unwrap(), b"more-data", TileFormat::Png).unwrap();

		let reader = DirectoryReader::open(dir.path()).unwrap();
		let eager = reader.all_tiles().unwrap();
		let streamed: Vec<(Tile, Vec<u8>)> = reader
			.iter_tiles()
			.map(|row| row.map(|(t, d, _)| (t, d)))
			.collect::<Result<_>>()
			.unwrap();
		assert_eq!(eager, streamed);
	}
}
