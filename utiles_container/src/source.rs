//! A format-erased tile source: the `cp` engine and `agg-hash`/`info`
//! commands read through this instead of knowing whether they're talking to
//! an MBTiles file or a directory pyramid.

use crate::directory::DirectoryReader;
use crate::mbtiles::MbtilesReader;
use anyhow::{bail, Result};
use std::path::Path;
use utiles_core::{Tile, TileType};

/// Either storage backend, behind one read interface.
pub enum TileSource {
	Mbtiles(MbtilesReader),
	Directory(DirectoryReader),
}

impl TileSource {
	/// Open `path` as an MBTiles file if it looks like a SQLite database
	/// (by extension), otherwise as a directory pyramid.
	pub fn open(path: &Path) -> Result<Self> {
		if path.is_dir() {
			Ok(TileSource::Directory(DirectoryReader::open(path)?))
		} else if path.is_file() {
			Ok(TileSource::Mbtiles(MbtilesReader::open(path)?))
		} else {
			bail!("{path:?} is neither a file nor a directory");
		}
	}

	pub fn get_tile(&self, tile: Tile) -> Result<Option<Vec<u8>>> {
		match self {
			TileSource::Mbtiles(r) => r.get_tile(tile),
			TileSource::Directory(r) => r.get_tile(tile),
		}
	}

	/// Every `(Tile, bytes)` pair in the source, in canonical order.
	pub fn all_tiles(&self) -> Result<Vec<(Tile, Vec<u8>)>> {
		match self {
			TileSource::Mbtiles(r) => r.all_tiles(),
			TileSource::Directory(r) => r.all_tiles(),
		}
	}

	/// Stream every `(Tile, bytes, TileType)` triple out of the source
	/// lazily, so a consumer (e.g. `cp`) never has to hold more than one
	/// tile's worth of payload in memory at a time.
	pub fn iter_tiles(&self) -> Box<dyn Iterator<Item = Result<(Tile, Vec<u8>, TileType)>> + '_> {
		match self {
			TileSource::Mbtiles(r) => Box::new(r.iter_tiles(None, None)),
			TileSource::Directory(r) => Box::new(r.iter_tiles()),
		}
	}

	pub fn tile_count(&self) -> Result<i64> {
		match self {
			TileSource::Mbtiles(r) => r.tile_count(),
			TileSource::Directory(r) => Ok(r.tile_count() as i64),
		}
	}
}
