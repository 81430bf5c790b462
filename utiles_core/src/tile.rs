//! Tile algebra: the `Tile{x,y,z}` type and the operations the rest of the
//! toolkit is built from — projection, parent/child/neighbor walks, quadkey
//! and PMTiles identifiers, bounding-tile search and grid enumeration.

use crate::error::UtilesError;
use crate::geo::{Bbox, LngLat, LngLatBbox};
use anyhow::{bail, ensure, Result};
use std::collections::BTreeSet;
use std::f64::consts::PI;

/// A Web-Mercator tile address. Ordered by `(z, y, x)` so a `BTreeSet<Tile>`
/// iterates zoom-major, which is the order the MBTiles schemas and the
/// `agg-hash` canonicalization rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
	pub x: u32,
	pub y: u32,
	pub z: u8,
}

impl PartialOrd for Tile {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Tile {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		(self.z, self.y, self.x).cmp(&(other.z, other.y, other.x))
	}
}

impl Tile {
	/// Construct a tile, validating that `0 <= x,y < 2^z`.
	pub fn new(x: u32, y: u32, z: u8) -> Result<Self> {
		let t = Self { x, y, z };
		ensure!(
			t.valid(),
			UtilesError::InvalidTile { x, y, z }
		);
		Ok(t)
	}

	/// Construct without bounds checking; used internally where validity is
	/// already guaranteed by construction (e.g. `parent()`, `tile()`).
	#[must_use]
	pub fn new_unchecked(x: u32, y: u32, z: u8) -> Self {
		Self { x, y, z }
	}

	#[must_use]
	pub fn valid(&self) -> bool {
		if self.z > 32 {
			return false;
		}
		let max = if self.z == 32 { u32::MAX } else { (1u32 << self.z) - 1 };
		self.x <= max && self.y <= max
	}

	// -- projection -------------------------------------------------------

	/// The northwest corner of the tile, in WGS84 degrees.
	#[must_use]
	pub fn ul(&self) -> LngLat {
		ul(self.x, self.y, self.z)
	}

	/// The tile's bounding box in WGS84 degrees.
	#[must_use]
	pub fn bounds(&self) -> LngLatBbox {
		let a = ul(self.x, self.y, self.z);
		let b = ul(self.x + 1, self.y + 1, self.z);
		LngLatBbox::new(a.lng, b.lat, b.lng, a.lat)
	}

	/// The tile's bounding box in spherical-Mercator meters.
	#[must_use]
	pub fn xy_bounds(&self) -> Bbox {
		let tile_size = 2.0 * PI * crate::geo::EARTH_RADIUS / 2f64.powi(i32::from(self.z));
		let left = f64::from(self.x) * tile_size - PI * crate::geo::EARTH_RADIUS;
		let right = f64::from(self.x + 1) * tile_size - PI * crate::geo::EARTH_RADIUS;
		let top = PI * crate::geo::EARTH_RADIUS - f64::from(self.y) * tile_size;
		let bottom = PI * crate::geo::EARTH_RADIUS - f64::from(self.y + 1) * tile_size;
		Bbox {
			left,
			bottom,
			right,
			top,
		}
	}

	// -- hierarchy ----------------------------------------------------------

	/// The tile one zoom level up, or `None` at `z == 0`.
	#[must_use]
	pub fn parent(&self) -> Option<Self> {
		if self.z == 0 {
			None
		} else {
			Some(Self::new_unchecked(self.x >> 1, self.y >> 1, self.z - 1))
		}
	}

	/// The ancestor at `zoom`, which must be `<= self.z`.
	pub fn parent_at(&self, zoom: u8) -> Result<Self> {
		ensure!(zoom <= self.z, UtilesError::InvalidZoom(i64::from(zoom)));
		let shift = self.z - zoom;
		Ok(Self::new_unchecked(self.x >> shift, self.y >> shift, zoom))
	}

	/// The four immediate children, in `(NW, NE, SE, SW)` order.
	#[must_use]
	pub fn children(&self) -> [Self; 4] {
		let z = self.z + 1;
		[
			Self::new_unchecked(self.x * 2, self.y * 2, z),
			Self::new_unchecked(self.x * 2 + 1, self.y * 2, z),
			Self::new_unchecked(self.x * 2 + 1, self.y * 2 + 1, z),
			Self::new_unchecked(self.x * 2, self.y * 2 + 1, z),
		]
	}

	/// The four immediate children in Z-order (Morton order): `(NW, NE, SW,
	/// SE)`. This is the ordering PMTiles directories expect for siblings.
	#[must_use]
	pub fn children_zorder(&self) -> [Self; 4] {
		let z = self.z + 1;
		[
			Self::new_unchecked(self.x * 2, self.y * 2, z),
			Self::new_unchecked(self.x * 2 + 1, self.y * 2, z),
			Self::new_unchecked(self.x * 2, self.y * 2 + 1, z),
			Self::new_unchecked(self.x * 2 + 1, self.y * 2 + 1, z),
		]
	}

	/// All descendants at `zoom`, which must be `>= self.z`.
	pub fn children_at(&self, zoom: u8) -> Result<Vec<Self>> {
		ensure!(zoom >= self.z, UtilesError::InvalidZoom(i64::from(zoom)));
		let mut frontier = vec![*self];
		for _ in self.z..zoom {
			frontier = frontier.iter().flat_map(Self::children).collect();
		}
		Ok(frontier)
	}

	/// Up to eight adjacent tiles at the same zoom, in `N, NE, E, SE, S, SW,
	/// W, NW` order, filtered to those that are valid (in-bounds).
	#[must_use]
	pub fn neighbors(&self) -> Vec<Self> {
		const OFFSETS: [(i64, i64); 8] = [
			(0, -1),
			(1, -1),
			(1, 0),
			(1, 1),
			(0, 1),
			(-1, 1),
			(-1, 0),
			(-1, -1),
		];
		OFFSETS
			.iter()
			.filter_map(|(dx, dy)| {
				let x = i64::from(self.x) + dx;
				let y = i64::from(self.y) + dy;
				if x < 0 || y < 0 {
					return None;
				}
				let (x, y) = (x as u32, y as u32);
				let t = Self::new_unchecked(x, y, self.z);
				t.valid().then_some(t)
			})
			.collect()
	}

	// -- identifiers --------------------------------------------------------

	/// The Microsoft quadkey string for this tile.
	#[must_use]
	pub fn quadkey(&self) -> String {
		let mut qk = String::with_capacity(self.z as usize);
		for i in (0..self.z).rev() {
			let mut digit = 0u8;
			let mask = 1u32 << i;
			if self.x & mask != 0 {
				digit += 1;
			}
			if self.y & mask != 0 {
				digit += 2;
			}
			qk.push((b'0' + digit) as char);
		}
		qk
	}

	/// Parse a quadkey string back into a tile.
	pub fn from_quadkey(quadkey: &str) -> Result<Self> {
		let mut x: u32 = 0;
		let mut y: u32 = 0;
		let z = quadkey.len() as u8;
		for c in quadkey.chars() {
			x <<= 1;
			y <<= 1;
			match c {
				'0' => {}
				'1' => x |= 1,
				'2' => y |= 1,
				'3' => {
					x |= 1;
					y |= 1;
				}
				_ => bail!(UtilesError::BadQuadkey {
					quadkey: quadkey.to_string(),
					reason: format!("invalid digit {c:?}"),
				}),
			}
		}
		Self::new(x, y, z)
	}

	/// The PMTiles Hilbert-curve tile ID. Zoom must be `<= 31` (the PMTiles
	/// spec reserves 64-bit IDs, which overflow past that level).
	pub fn pmtileid(&self) -> Result<u64> {
		ensure!(self.z <= 31, UtilesError::InvalidZoom(i64::from(self.z)));
		let base = zoom_base(self.z);
		let d = if self.z == 0 {
			0
		} else {
			hilbert_xy2d(1u32 << self.z, self.x, self.y)
		};
		Ok(base + u64::from(d))
	}

	/// Inverse of [`Tile::pmtileid`].
	pub fn from_pmtileid(id: u64) -> Result<Self> {
		let mut z: u8 = 0;
		let mut base: u64 = 0;
		loop {
			let level_count = 1u64 << (2 * u32::from(z));
			let next_base = base + level_count;
			if id < next_base {
				break;
			}
			base = next_base;
			ensure!(z < 31, UtilesError::DecodeError(format!("pmtile id {id} out of range")));
			z += 1;
		}
		let d = (id - base) as u32;
		let (x, y) = if z == 0 { (0, 0) } else { hilbert_d2xy(1u32 << z, d) };
		Self::new(x, y, z)
	}
}

/// Cumulative tile count before zoom `z`: `(4^z - 1) / 3`.
fn zoom_base(z: u8) -> u64 {
	((1u64 << (2 * u32::from(z))) - 1) / 3
}

/// Classic Hilbert-curve `(x, y) -> d` for an `n x n` grid (`n` a power of two).
fn hilbert_xy2d(n: u32, mut x: u32, mut y: u32) -> u32 {
	let mut d: u64 = 0;
	let mut s = n / 2;
	while s > 0 {
		let rx = u32::from((x & s) > 0);
		let ry = u32::from((y & s) > 0);
		d += u64::from(s) * u64::from(s) * u64::from((3 * rx) ^ ry);
		hilbert_rotate(s, &mut x, &mut y, rx, ry);
		s /= 2;
	}
	d as u32
}

/// Inverse of [`hilbert_xy2d`].
fn hilbert_d2xy(n: u32, d: u32) -> (u32, u32) {
	let mut rx;
	let mut ry;
	let mut t = d;
	let (mut x, mut y) = (0u32, 0u32);
	let mut s = 1u32;
	while s < n {
		rx = 1 & (t / 2);
		ry = 1 & (t ^ rx);
		hilbert_rotate(s, &mut x, &mut y, rx, ry);
		x += s * rx;
		y += s * ry;
		t /= 4;
		s *= 2;
	}
	(x, y)
}

fn hilbert_rotate(n: u32, x: &mut u32, y: &mut u32, rx: u32, ry: u32) {
	if ry == 0 {
		if rx == 1 {
			*x = n - 1 - *x;
			*y = n - 1 - *y;
		}
		std::mem::swap(x, y);
	}
}

/// Northwest corner of tile `(x, y, z)`, in WGS84 degrees.
#[must_use]
pub fn ul(x: u32, y: u32, z: u8) -> LngLat {
	let z2 = 2f64.powi(i32::from(z));
	let lng = f64::from(x) / z2 * 360.0 - 180.0;
	let n = PI - 2.0 * PI * f64::from(y) / z2;
	let lat = (0.5 * (n.exp() - (-n).exp())).atan().to_degrees();
	LngLat::new(lng, lat)
}

/// The tile containing `(lng, lat)` at `zoom`.
pub fn tile(lng: f64, lat: f64, zoom: u8, truncate: bool) -> Result<Tile> {
	let p = if truncate {
		LngLat::new(lng, lat).truncated()
	} else {
		LngLat::new(lng, lat)
	};
	let (fx, fy) = p.mercator_fraction()?;
	let z2 = 2f64.powi(i32::from(zoom));
	let max = if zoom == 32 { u32::MAX as i64 } else { (1i64 << zoom) - 1 };
	let x = ((fx * z2).floor() as i64).clamp(0, max) as u32;
	let y = ((fy * z2).floor() as i64).clamp(0, max) as u32;
	Ok(Tile::new_unchecked(x, y, zoom))
}

/// Lazily enumerate every tile overlapping `bbox` at each zoom in `zooms`,
/// splitting across the antimeridian and trimming by an epsilon so that
/// edge-aligned queries don't spuriously pick up a neighboring tile.
pub fn tiles(bbox: LngLatBbox, zooms: Vec<u8>, truncate: bool) -> Result<impl Iterator<Item = Tile>> {
	let bbox = if truncate { bbox.truncated() } else { bbox };
	let pieces = bbox.split_antimeridian();
	let mut out = Vec::new();
	for piece in pieces {
		let clipped = piece.web_mercator_clip();
		let eroded = clipped.eroded();
		for z in &zooms {
			let ul_tile = tile(eroded.west, eroded.north, *z, false)?;
			let lr_tile = tile(eroded.east, eroded.south, *z, false)?;
			for i in ul_tile.x..=lr_tile.x {
				for j in ul_tile.y..=lr_tile.y {
					out.push(Tile::new_unchecked(i, j, *z));
				}
			}
		}
	}
	Ok(out.into_iter())
}

/// Eagerly collect [`tiles`] into a `Vec`, for callers (and FFI-style
/// boundaries) that don't want a lazy iterator.
pub fn tiles_list(bbox: LngLatBbox, zooms: Vec<u8>, truncate: bool) -> Result<Vec<Tile>> {
	Ok(tiles(bbox, zooms, truncate)?.collect())
}

/// The smallest single tile that fully contains `bbox`, per the classic
/// "common bit prefix at zoom 32" algorithm: locate the NW and SE corners at
/// zoom 32, then find the highest zoom at which their x/y coordinates still
/// share every bit.
pub fn bounding_tile(bbox: LngLatBbox, truncate: bool) -> Result<Tile> {
	let bbox = if truncate { bbox.truncated() } else { bbox };
	let e = bbox.east.min(180.0);
	let s = bbox.south.max(-85.051_129);
	let w = bbox.west.max(-180.0);
	let n = bbox.north.min(85.051_129);

	if w != s && e == n {
		return tile(w, n, 32, false);
	}

	let tmin = tile(w, n, 32, false)?;
	let tmax = tile(e, s, 32, false)?;

	let z = bbox_common_zoom(tmin.x, tmin.y, tmax.x, tmax.y);
	if z == 0 {
		return Tile::new(0, 0, 0);
	}
	let x = tmin.x >> (32 - z);
	let y = tmin.y >> (32 - z);
	Tile::new(x, y, z)
}

/// Highest zoom `z` (up to 32) at which `(x0,y0)` and `(x1,y1)` share every
/// bit down to bit `32 - z`.
fn bbox_common_zoom(x0: u32, y0: u32, x1: u32, y1: u32) -> u8 {
	for z in 0u8..32 {
		let mask = 1u32 << (32 - (z + 1));
		if (x0 & mask) != (x1 & mask) || (y0 & mask) != (y1 & mask) {
			return z;
		}
	}
	32
}

/// Collapse a set of tiles by repeatedly merging four sibling children into
/// their shared parent, then dropping any tile whose ancestor is already in
/// the (merged) set. Iterates to a fixed point, never merging past `floor`
/// (the lowest zoom the caller wants to keep).
#[must_use]
pub fn simplify(tiles: impl IntoIterator<Item = Tile>, floor: u8) -> BTreeSet<Tile> {
	let mut set: BTreeSet<Tile> = tiles.into_iter().collect();
	if set.is_empty() {
		return set;
	}

	loop {
		let mut parents = BTreeSet::new();
		for t in &set {
			if t.z > floor {
				if let Some(p) = t.parent() {
					let siblings = p.children();
					if siblings.iter().all(|s| set.contains(s)) {
						parents.insert(p);
					}
				}
			}
		}
		if parents.is_empty() {
			break;
		}
		for p in &parents {
			for c in p.children() {
				set.remove(&c);
			}
		}
		set.extend(parents);
	}

	let mut dead = Vec::new();
	for t in &set {
		let mut cur = *t;
		while cur.z > floor {
			cur = cur.parent().unwrap();
			if set.contains(&cur) {
				dead.push(*t);
				break;
			}
		}
	}
	for t in dead {
		set.remove(&t);
	}
	set
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn quadkey_roundtrip() {
		let t = Tile::new(486, 332, 10).unwrap();
		assert_eq!(t.quadkey(), "0313102310");
		assert_eq!(Tile::from_quadkey("0313102310").unwrap(), t);
	}

	#[test]
	fn pmtileid_roundtrip() {
		assert_eq!(Tile::new(0, 0, 0).unwrap().pmtileid().unwrap(), 0);
		assert_eq!(Tile::new(0, 0, 1).unwrap().pmtileid().unwrap(), 1);
		for z in 0..=10u8 {
			for x in 0..(1u32 << z).min(5) {
				for y in 0..(1u32 << z).min(5) {
					let t = Tile::new(x, y, z).unwrap();
					let id = t.pmtileid().unwrap();
					assert_eq!(Tile::from_pmtileid(id).unwrap(), t);
				}
			}
		}
	}

	#[test]
	fn tile_from_lnglat() {
		let t = tile(20.6852, 40.1222, 9, false).unwrap();
		assert_eq!((t.x, t.y, t.z), (285, 193, 9));
	}

	#[test]
	fn bounding_tile_matches() {
		let bt = bounding_tile(LngLatBbox::new(-92.5, 0.5, -90.5, 1.5), false).unwrap();
		assert_eq!((bt.x, bt.y, bt.z), (31, 63, 7));
	}

	#[test]
	fn tiles_grid_matches_known_pair() {
		let list = tiles_list(LngLatBbox::new(-105.0, 39.99, -104.99, 40.0), vec![14], false).unwrap();
		let mut list = list;
		list.sort();
		assert_eq!(
			list,
			vec![
				Tile::new(3413, 6202, 14).unwrap(),
				Tile::new(3413, 6203, 14).unwrap(),
			]
		);
	}

	#[test]
	fn ul_and_bounds_roundtrip() {
		let t = Tile::new(486, 332, 10).unwrap();
		let b = t.bounds();
		let back = tile(b.west + 1e-7, b.north - 1e-7, 10, false).unwrap();
		assert_eq!(back, t);
	}

	#[rstest]
	#[case(0, 0, 0, true)]
	#[case(1, 1, 1, false)]
	#[case(0, 0, 1, true)]
	fn validity(#[case] x: u32, #[case] y: u32, #[case] z: u8, #[case] expect: bool) {
		assert_eq!(Tile::new_unchecked(x, y, z).valid(), expect);
	}

	#[test]
	fn root_has_no_neighbors() {
		let root = Tile::new(0, 0, 0).unwrap();
		assert!(root.neighbors().is_empty());
	}

	#[test]
	fn simplify_merges_four_siblings() {
		let parent = Tile::new(1, 1, 1).unwrap();
		let children: BTreeSet<Tile> = parent.children().into_iter().collect();
		let simplified = simplify(children, 0);
		assert_eq!(simplified, BTreeSet::from([parent]));
	}

	#[test]
	fn simplify_drops_covered_descendants() {
		let parent = Tile::new(1, 1, 1).unwrap();
		let child = parent.children()[0];
		let grandchild = child.children()[0];
		let simplified = simplify([parent, child, grandchild], 0);
		assert_eq!(simplified, BTreeSet::from([parent]));
	}

	#[test]
	fn simplify_is_idempotent() {
		let parent = Tile::new(5, 5, 6).unwrap();
		let once = simplify(parent.children(), 0);
		let twice = simplify(once.clone(), 0);
		assert_eq!(once, twice);
	}

	#[test]
	fn simplify_never_merges_below_the_floor() {
		let ancestor = Tile::new(1, 1, 1).unwrap();
		let grandchildren: BTreeSet<Tile> =
			ancestor.children().into_iter().flat_map(|c| c.children()).collect();
		assert_eq!(grandchildren.len(), 16);

		let fully_simplified = simplify(grandchildren.clone(), 0);
		assert_eq!(fully_simplified, BTreeSet::from([ancestor]));

		let floored = simplify(grandchildren, 2);
		let expected: BTreeSet<Tile> = ancestor.children().into_iter().collect();
		assert_eq!(floored, expected, "merging must stop at the floor zoom");
	}

	#[test]
	fn children_zorder_differs_from_default() {
		let t = Tile::new(0, 0, 0).unwrap();
		assert_ne!(t.children(), t.children_zorder());
	}
}
