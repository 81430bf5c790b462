//! Emit tile boundaries as GeoJSON, the way the `shapes` CLI command does:
//! one polygon (or bbox) per tile, optionally buffered, reprojected into
//! Mercator meters, and rounded to a fixed coordinate precision.

use geojson::{Feature, Geometry as GjGeometry, Value};
use serde_json::{Map, Number, Value as JsonValue};
use utiles_core::{geo::lnglat_to_meters, Tile};

/// Options controlling how [`shape`] renders a tile.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeOptions {
	/// Round coordinates to this many decimal places, if set.
	pub precision: Option<u8>,
	/// Emit coordinates in EPSG:3857 meters instead of WGS84 degrees.
	pub mercator: bool,
	/// Emit a `[west, south, east, north]` bbox geometry instead of a
	/// closed polygon ring.
	pub bbox: bool,
	/// Expand the tile's bounds by this many degrees (or meters, under
	/// `mercator`) on every side before rendering.
	pub buffer: f64,
}

/// Render a single tile as a GeoJSON `Feature` carrying its `x`, `y`, `z` as
/// properties.
#[must_use]
pub fn shape(tile: Tile, opts: ShapeOptions) -> Feature {
	let bounds = tile.bounds();
	let (mut west, mut south, mut east, mut north) = (bounds.west, bounds.south, bounds.east, bounds.north);
	west -= opts.buffer;
	south -= opts.buffer;
	east += opts.buffer;
	north += opts.buffer;

	let geometry = if opts.mercator {
		let (w, s) = lnglat_to_meters(west, south);
		let (e, n) = lnglat_to_meters(east, north);
		render_geometry(w, s, e, n, opts)
	} else {
		render_geometry(west, south, east, north, opts)
	};

	let mut properties = Map::new();
	properties.insert("x".to_string(), JsonValue::Number(Number::from(tile.x)));
	properties.insert("y".to_string(), JsonValue::Number(Number::from(tile.y)));
	properties.insert("z".to_string(), JsonValue::Number(Number::from(tile.z)));

	Feature {
		bbox: None,
		geometry: Some(geometry),
		id: None,
		properties: Some(properties),
		foreign_members: None,
	}
}

fn render_geometry(west: f64, south: f64, east: f64, north: f64, opts: ShapeOptions) -> GjGeometry {
	let round = |v: f64| round_to(v, opts.precision);
	GjGeometry::new(Value::Polygon(vec![vec![
		vec![round(west), round(north)],
		vec![round(east), round(north)],
		vec![round(east), round(south)],
		vec![round(west), round(south)],
		vec![round(west), round(north)],
	]]))
}

/// `[west, south, east, north]` for a tile, honoring the same buffer and
/// precision as [`shape`]; used by the CLI's `--bbox` output mode, which
/// prints a bare bbox array per tile instead of a polygon `Feature`.
#[must_use]
pub fn bbox_array(tile: Tile, opts: ShapeOptions) -> [f64; 4] {
	let bounds = tile.bounds();
	let (west, south, east, north) = (
		bounds.west - opts.buffer,
		bounds.south - opts.buffer,
		bounds.east + opts.buffer,
		bounds.north + opts.buffer,
	);
	let round = |v: f64| round_to(v, opts.precision);
	if opts.mercator {
		let (w, s) = lnglat_to_meters(west, south);
		let (e, n) = lnglat_to_meters(east, north);
		[round(w), round(s), round(e), round(n)]
	} else {
		[round(west), round(south), round(east), round(north)]
	}
}

fn round_to(value: f64, precision: Option<u8>) -> f64 {
	match precision {
		Some(p) => {
			let factor = 10f64.powi(i32::from(p));
			(value * factor).round() / factor
		}
		None => value,
	}
}

/// Render every tile into a GeoJSON `FeatureCollection`.
#[must_use]
pub fn shapes_collection(tiles: impl IntoIterator<Item = Tile>, opts: ShapeOptions) -> geojson::FeatureCollection {
	geojson::FeatureCollection {
		bbox: None,
		features: tiles.into_iter().map(|t| shape(t, opts)).collect(),
		foreign_members: None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn shape_has_xyz_properties() {
		let t = Tile::new(1, 2, 3).unwrap();
		let f = shape(t, ShapeOptions::default());
		let props = f.properties.unwrap();
		assert_eq!(props["x"], JsonValue::Number(Number::from(1)));
		assert_eq!(props["y"], JsonValue::Number(Number::from(2)));
		assert_eq!(props["z"], JsonValue::Number(Number::from(3)));
	}

	#[test]
	fn collection_has_one_feature_per_tile() {
		let tiles = vec![Tile::new(0, 0, 1).unwrap(), Tile::new(1, 1, 1).unwrap()];
		let fc = shapes_collection(tiles, ShapeOptions::default());
		assert_eq!(fc.features.len(), 2);
	}
}
