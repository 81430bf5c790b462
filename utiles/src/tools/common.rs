//! Shared stdin-to-`Tile` decoding used by `parent`, `children`, `neighbors`,
//! `quadkey`, and `edges` — each of which accepts tile triples or quadkeys
//! interchangeably.

use crate::stdin_stream::StdinValue;
use anyhow::Result;
use utiles_core::{Tile, UtilesError};

/// Out-of-range sentinel reported when the input isn't shaped like a tile at
/// all (wrong-length array, or a GeoJSON object where a tile was expected).
pub(crate) const BAD_TILE: UtilesError = UtilesError::InvalidTile {
	x: u32::MAX,
	y: u32::MAX,
	z: u8::MAX,
};

pub fn tile_from_value(value: &StdinValue) -> Result<Tile> {
	match value {
		StdinValue::Array(json) => {
			let nums: Vec<i64> = serde_json::from_value(json.clone())?;
			match nums.as_slice() {
				[x, y, z] => Tile::new(*x as u32, *y as u32, *z as u8),
				_ => Err(BAD_TILE.into()),
			}
		}
		StdinValue::Quadkey(q) => Tile::from_quadkey(q),
		StdinValue::Object(_) => Err(BAD_TILE.into()),
	}
}
