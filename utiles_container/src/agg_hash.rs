//! `agg-hash`: a single MD5 digest summarizing an entire tile set,
//! independent of which MBTiles schema (or directory layout) stores it.
//! Two databases with identical tiles hash identically even if one
//! dedups content and the other doesn't.

use crate::source::TileSource;
use anyhow::Result;
use md5::{Digest, Md5};
use std::path::Path;
use utiles_core::LngLatBbox;

/// The result of an `agg-hash` run.
#[derive(Debug, Clone)]
pub struct AggHash {
	pub hash: String,
	pub ntiles: usize,
}

/// Hash every tile in `path`, optionally restricted to `bbox`, by
/// concatenating each tile's own content hash in canonical `(z, y, x)`
/// order and hashing the concatenation.
pub fn agg_hash(path: &Path, bbox: Option<LngLatBbox>) -> Result<AggHash> {
	let source = TileSource::open(path)?;
	let mut tiles = source.all_tiles()?;
	if let Some(bbox) = bbox {
		tiles.retain(|(t, _)| {
			let tb = t.bounds();
			tb.west < bbox.east && tb.east > bbox.west && tb.south < bbox.north && tb.north > bbox.south
		});
	}
	tiles.sort_by(|a, b| a.0.cmp(&b.0));

	let mut hasher = Md5::new();
	for (tile, data) in &tiles {
		hasher.update(tile.z.to_le_bytes());
		hasher.update(tile.x.to_le_bytes());
		hasher.update(tile.y.to_le_bytes());
		hasher.update(hex_md5(data).as_bytes());
	}

	Ok(AggHash {
		hash: hex_encode(&hasher.finalize()),
		ntiles: tiles.len(),
	})
}

fn hex_md5(data: &[u8]) -> String {
	let mut hasher = Md5::new();
	hasher.update(data);
	hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
	use std::fmt::Write;
	let mut s = String::with_capacity(bytes.len() * 2);
	for b in bytes {
		write!(s, "{b:02x}").unwrap();
	}
	s
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mbtiles::{ConflictPolicy, MbtilesWriter};
	use crate::schema::DbType;
	use assert_fs::NamedTempFile;
	use utiles_core::Tile;

	#[test]
	fn identical_tiles_hash_identically_across_schemas() {
		let flat_file = NamedTempFile::new("flat.mbtiles").unwrap();
		let mut flat = MbtilesWriter::create(&flat_file, DbType::Flat, None).unwrap();
		flat.insert_tile(Tile::new(0, 0, 1).unwrap(), b"tile-a", ConflictPolicy::Throw).unwrap();
		flat.insert_tile(Tile::new(1, 0, 1).unwrap(), b"tile-b", ConflictPolicy::Throw).unwrap();
		drop(flat);

		let hash_file = NamedTempFile::new("hash.mbtiles").unwrap();
		let mut hashed = MbtilesWriter::create(&hash_file, DbType::Hash, None).unwrap();
		hashed.insert_tile(Tile::new(0, 0, 1).unwrap(), b"tile-a", ConflictPolicy::Throw).unwrap();
		hashed.insert_tile(Tile::new(1, 0, 1).unwrap(), b"tile-b", ConflictPolicy::Throw).unwrap();
		drop(hashed);

		let a = agg_hash(&flat_file, None).unwrap();
		let b = agg_hash(&hash_file, None).unwrap();
		assert_eq!(a.hash, b.hash);
		assert_eq!(a.ntiles, 2);
		// Pinned against the `(z, x, y, hex_md5(data))`-concatenation
		// algorithm above for this exact two-tile fixture, so a change to the
		// digest construction (byte order, case, field order) shows up as a
		// test failure rather than silently drifting.
		assert_eq!(a.hash, "361a5f47af2b536fd8f8494924ccdb91");
	}
}
