//! Boundary extraction for a tile set: a tile is on the edge iff at least
//! one of its four cardinal (N/E/S/W) neighbors is absent from the set.

use std::collections::BTreeSet;
use utiles_core::Tile;

/// The subset of `tiles` that border the outside of the set.
#[must_use]
pub fn edges(tiles: &BTreeSet<Tile>) -> BTreeSet<Tile> {
	tiles
		.iter()
		.copied()
		.filter(|t| cardinal_neighbors(*t).iter().any(|n| !tiles.contains(n)))
		.collect()
}

fn cardinal_neighbors(t: Tile) -> [Tile; 4] {
	[
		Tile::new_unchecked(t.x, t.y.wrapping_sub(1), t.z),
		Tile::new_unchecked(t.x + 1, t.y, t.z),
		Tile::new_unchecked(t.x, t.y + 1, t.z),
		Tile::new_unchecked(t.x.wrapping_sub(1), t.y, t.z),
	]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn single_tile_is_its_own_edge() {
		let t = Tile::new(5, 5, 4).unwrap();
		let set = BTreeSet::from([t]);
		assert_eq!(edges(&set), set);
	}

	#[test]
	fn interior_tile_of_solid_block_is_not_an_edge() {
		let mut set = BTreeSet::new();
		for x in 0..3 {
			for y in 0..3 {
				set.insert(Tile::new(x, y, 4).unwrap());
			}
		}
		let e = edges(&set);
		assert!(!e.contains(&Tile::new(1, 1, 4).unwrap()));
		assert!(e.contains(&Tile::new(0, 0, 4).unwrap()));
		assert_eq!(e.len(), 8);
	}
}
