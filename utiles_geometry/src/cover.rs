//! Rasterize geometries into the set of tiles they overlap at a given zoom:
//! points and lines are stepped over a Bresenham-style grid walk, polygons
//! are filled with an even-odd scanline, and everything is deduplicated
//! into a single tile set.

use anyhow::{bail, Result};
use geo_types::{Coord, Geometry, LineString, Polygon};
use std::collections::BTreeSet;
use utiles_core::{simplify, tile as project_tile, Tile};

/// Project a geographic coordinate to fractional (not floored) tile-grid
/// coordinates at `zoom`. This is the continuous analogue of
/// [`utiles_core::tile::tile`], needed so polygon edges can be rasterized
/// sub-tile-accurately.
fn fractional(coord: Coord<f64>, zoom: u8) -> Result<(f64, f64)> {
	let ll = utiles_core::LngLat::new(coord.x, coord.y);
	let (fx, fy) = ll.mercator_fraction()?;
	let z2 = 2f64.powi(i32::from(zoom));
	Ok((fx * z2, fy * z2))
}

/// Cover a single geometry at `zoom`, returning the deduplicated tile set.
pub fn cover(geometry: &Geometry<f64>, zoom: u8) -> Result<BTreeSet<Tile>> {
	match geometry {
		Geometry::Point(p) => Ok(point_tile(p.0, zoom)?.into_iter().collect()),
		Geometry::MultiPoint(mp) => {
			let mut out = BTreeSet::new();
			for p in mp {
				out.extend(point_tile(p.0, zoom)?);
			}
			Ok(out)
		}
		Geometry::Line(l) => burn_line(&[l.start, l.end], zoom),
		Geometry::LineString(ls) => burn_line(&ls.0, zoom),
		Geometry::MultiLineString(mls) => {
			let mut out = BTreeSet::new();
			for ls in mls {
				out.extend(burn_line(&ls.0, zoom)?);
			}
			Ok(out)
		}
		Geometry::Polygon(poly) => fill_polygon(poly, zoom),
		Geometry::MultiPolygon(mp) => {
			let mut out = BTreeSet::new();
			for poly in mp {
				out.extend(fill_polygon(poly, zoom)?);
			}
			Ok(out)
		}
		Geometry::Rect(r) => fill_polygon(&r.to_polygon(), zoom),
		Geometry::Triangle(t) => fill_polygon(&t.to_polygon(), zoom),
		Geometry::GeometryCollection(gc) => {
			let mut out = BTreeSet::new();
			for g in gc {
				out.extend(cover(g, zoom)?);
			}
			Ok(out)
		}
	}
}

/// Cover every geometry in `geometries` and union the results.
pub fn cover_all<'a>(geometries: impl IntoIterator<Item = &'a Geometry<f64>>, zoom: u8) -> Result<BTreeSet<Tile>> {
	let mut out = BTreeSet::new();
	for g in geometries {
		out.extend(cover(g, zoom)?);
	}
	Ok(out)
}

/// Cover every geometry at `maxzoom`, then merge siblings upward as far as
/// `minzoom` allows (never past it). `minzoom == maxzoom` is the same as
/// [`cover_all`] with no simplification.
pub fn cover_range<'a>(
	geometries: impl IntoIterator<Item = &'a Geometry<f64>>,
	minzoom: u8,
	maxzoom: u8,
) -> Result<BTreeSet<Tile>> {
	let covered = cover_all(geometries, maxzoom)?;
	if minzoom >= maxzoom {
		return Ok(covered);
	}
	Ok(simplify(covered, minzoom))
}

fn point_tile(coord: Coord<f64>, zoom: u8) -> Result<Option<Tile>> {
	if !(-90.0..=90.0).contains(&coord.y) {
		bail!(utiles_core::UtilesError::InvalidLat(coord.y));
	}
	Ok(Some(project_tile(coord.x, coord.y, zoom, false)?))
}

/// Walk every line segment of a (possibly open) line string and collect
/// every tile the segment's supercover line touches.
fn burn_line(coords: &[Coord<f64>], zoom: u8) -> Result<BTreeSet<Tile>> {
	let mut out = BTreeSet::new();
	for pair in coords.windows(2) {
		let a = fractional(pair[0], zoom)?;
		let b = fractional(pair[1], zoom)?;
		for (x, y) in grid_line(a, b) {
			if x >= 0 && y >= 0 {
				if let Ok(t) = Tile::new(x as u32, y as u32, zoom) {
					out.insert(t);
				}
			}
		}
	}
	Ok(out)
}

/// Bresenham's line algorithm over the tile grid, visiting every integer
/// cell from `a` to `b` inclusive.
fn grid_line(a: (f64, f64), b: (f64, f64)) -> Vec<(i64, i64)> {
	let mut x0 = a.0.floor() as i64;
	let mut y0 = a.1.floor() as i64;
	let x1 = b.0.floor() as i64;
	let y1 = b.1.floor() as i64;

	let dx = (x1 - x0).abs();
	let dy = (y1 - y0).abs();
	let sx: i64 = if x0 < x1 { 1 } else { -1 };
	let sy: i64 = if y0 < y1 { 1 } else { -1 };
	let mut err = dx - dy;

	let mut cells = Vec::new();
	loop {
		cells.push((x0, y0));
		if x0 == x1 && y0 == y1 {
			break;
		}
		let e2 = 2 * err;
		if e2 > -dy {
			err -= dy;
			x0 += sx;
		}
		if e2 < dx {
			err += dx;
			y0 += sy;
		}
	}
	cells
}

/// Even-odd scanline fill of a polygon (exterior ring plus holes, holes
/// simply contribute their edges to the same intersection test) into the
/// tile grid at `zoom`.
fn fill_polygon(poly: &Polygon<f64>, zoom: u8) -> Result<BTreeSet<Tile>> {
	let mut edges: Vec<((f64, f64), (f64, f64))> = Vec::new();
	let mut out = BTreeSet::new();
	for ring in std::iter::once(poly.exterior()).chain(poly.interiors()) {
		out.extend(burn_line(&ring.0, zoom)?);
		push_ring_edges(ring, zoom, &mut edges)?;
	}
	if edges.is_empty() {
		return Ok(out);
	}

	let y_min = edges
		.iter()
		.flat_map(|(a, b)| [a.1, b.1])
		.fold(f64::INFINITY, f64::min);
	let y_max = edges
		.iter()
		.flat_map(|(a, b)| [a.1, b.1])
		.fold(f64::NEG_INFINITY, f64::max);

	let row_start = y_min.floor() as i64;
	let row_end = y_max.ceil() as i64;

	for row in row_start..row_end {
		let scan_y = row as f64 + 0.5;
		let mut xs: Vec<f64> = Vec::new();
		for (a, b) in &edges {
			let (lo, hi) = if a.1 < b.1 { (a, b) } else { (b, a) };
			if scan_y >= lo.1 && scan_y < hi.1 {
				let t = (scan_y - lo.1) / (hi.1 - lo.1);
				xs.push(lo.0 + t * (hi.0 - lo.0));
			}
		}
		xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
		for pair in xs.chunks_exact(2) {
			let start = pair[0].floor() as i64;
			let end = (pair[1] - 1e-9).floor() as i64;
			for col in start..=end {
				if col >= 0 && row >= 0 {
					if let Ok(t) = Tile::new(col as u32, row as u32, zoom) {
						out.insert(t);
					}
				}
			}
		}
	}
	Ok(out)
}

fn push_ring_edges(ring: &LineString<f64>, zoom: u8, edges: &mut Vec<((f64, f64), (f64, f64))>) -> Result<()> {
	for pair in ring.0.windows(2) {
		let a = fractional(pair[0], zoom)?;
		let b = fractional(pair[1], zoom)?;
		if a.1 != b.1 {
			edges.push((a, b));
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use geo_types::{polygon, Point};

	#[test]
	fn point_cover_is_single_tile() {
		let geom = Geometry::Point(Point::new(20.6852, 40.1222));
		let covered = cover(&geom, 9).unwrap();
		assert_eq!(covered.len(), 1);
		assert!(covered.contains(&Tile::new(285, 193, 9).unwrap()));
	}

	#[test]
	fn small_square_polygon_covers_expected_region() {
		let square = polygon![
			(x: -10.0, y: -10.0),
			(x: 10.0, y: -10.0),
			(x: 10.0, y: 10.0),
			(x: -10.0, y: 10.0),
			(x: -10.0, y: -10.0),
		];
		let covered = cover(&Geometry::Polygon(square), 2).unwrap();
		assert!(!covered.is_empty());
		for t in &covered {
			assert_eq!(t.z, 2);
		}
	}

	#[test]
	fn polygon_with_hole_excludes_center() {
		let donut = Polygon::new(
			LineString::from(vec![
				(-10.0, -10.0),
				(10.0, -10.0),
				(10.0, 10.0),
				(-10.0, 10.0),
				(-10.0, -10.0),
			]),
			vec![LineString::from(vec![
				(-1.0, -1.0),
				(1.0, -1.0),
				(1.0, 1.0),
				(-1.0, 1.0),
				(-1.0, -1.0),
			])],
		);
		let covered = cover(&Geometry::Polygon(donut), 6).unwrap();
		let center = project_tile(0.0, 0.0, 6, false).unwrap();
		assert!(!covered.contains(&center), "hole should exclude the center tile");
	}

	#[test]
	fn line_cover_touches_every_grid_cell_between_endpoints() {
		let line = LineString::from(vec![(-100.0, 40.0), (-90.0, 45.0)]);
		let covered = cover(&Geometry::LineString(line), 5).unwrap();
		assert!(covered.len() >= 2);
	}

	#[test]
	fn cover_range_simplifies_up_to_minzoom() {
		let geom = Geometry::Polygon(polygon![
			(x: -179.0, y: -60.0),
			(x: 179.0, y: -60.0),
			(x: 179.0, y: 60.0),
			(x: -179.0, y: 60.0),
			(x: -179.0, y: -60.0),
		]);
		let at_maxzoom = cover(&geom, 4).unwrap();
		let ranged = cover_range([&geom], 0, 4).unwrap();
		assert!(ranged.iter().map(|t| t.z).max().unwrap() <= 4);
		assert!(
			ranged.len() < at_maxzoom.len(),
			"simplifying down to minzoom 0 should shrink the tile set"
		);
	}

	#[test]
	fn cover_range_with_equal_zooms_matches_cover_all() {
		let geom = Geometry::Point(Point::new(20.6852, 40.1222));
		let ranged = cover_range([&geom], 9, 9).unwrap();
		let plain = cover(&geom, 9).unwrap();
		assert_eq!(ranged, plain);
	}
}
