//! `tiles Z [bbox]`: read bboxes or GeoJSON from stdin, emit every tile
//! covering them at zoom `Z`.

use crate::stdin_stream::{read_values, write_value, StdinValue};
use anyhow::Result;
use clap::Args;
use std::io::Write;
use utiles_core::{LngLatBbox, UtilesError};

#[derive(Args, Debug)]
pub struct Subcommand {
	/// Zoom level to cover at.
	pub zoom: u8,

	/// `west south east north` bbox, taken in place of stdin.
	#[arg(num_args = 4, allow_negative_numbers = true)]
	pub bbox: Option<Vec<f64>>,

	/// Emit values as an RS-prefixed JSON text sequence.
	#[arg(long)]
	pub seq: bool,
}

pub fn run(args: &Subcommand) -> Result<()> {
	let stdout = std::io::stdout();
	let mut out = stdout.lock();

	if let Some(b) = &args.bbox {
		let bbox = bbox_from_slice(b)?;
		for tile in utiles_core::tiles_list(bbox, vec![args.zoom], true)? {
			write_value(&mut out, &serde_json::json!([tile.x, tile.y, tile.z]), args.seq)?;
		}
		return Ok(());
	}

	let stdin = std::io::stdin();
	for value in read_values(stdin.lock())? {
		for bbox in bboxes_from_value(value)? {
			for tile in utiles_core::tiles_list(bbox, vec![args.zoom], true)? {
				write_value(&mut out, &serde_json::json!([tile.x, tile.y, tile.z]), args.seq)?;
			}
		}
	}
	out.flush()?;
	Ok(())
}

pub(crate) fn bbox_from_slice(values: &[f64]) -> Result<LngLatBbox> {
	match values {
		[west, south, east, north] => Ok(LngLatBbox::new(*west, *south, *east, *north)),
		_ => Err(UtilesError::InvalidBbox {
			west: values.first().copied().unwrap_or(f64::NAN),
			south: values.get(1).copied().unwrap_or(f64::NAN),
			east: values.get(2).copied().unwrap_or(f64::NAN),
			north: values.get(3).copied().unwrap_or(f64::NAN),
			reason: format!("bbox must have exactly 4 numbers, got {}", values.len()),
		}
		.into()),
	}
}

pub(crate) fn bboxes_from_value(value: StdinValue) -> Result<Vec<LngLatBbox>> {
	match value {
		StdinValue::Array(json) => {
			let nums: Vec<f64> = serde_json::from_value(json)?;
			Ok(vec![bbox_from_slice(&nums)?])
		}
		StdinValue::Object(json) => {
			let parsed = utiles_geometry::parse_geojson(&json.to_string())?;
			parsed
				.geometries
				.iter()
				.map(|g| geometry_bbox(g))
				.collect::<Result<Vec<_>>>()
		}
		StdinValue::Quadkey(q) => {
			let tile = utiles_core::Tile::from_quadkey(&q)?;
			Ok(vec![tile.bounds()])
		}
	}
}

fn geometry_bbox(geometry: &geo_types::Geometry<f64>) -> Result<LngLatBbox> {
	let mut west = f64::INFINITY;
	let mut south = f64::INFINITY;
	let mut east = f64::NEG_INFINITY;
	let mut north = f64::NEG_INFINITY;
	let mut fold = |x: f64, y: f64| {
		west = west.min(x);
		east = east.max(x);
		south = south.min(y);
		north = north.max(y);
	};
	fold_geometry_coords(geometry, &mut fold);
	if !west.is_finite() {
		return Err(UtilesError::InvalidBbox {
			west,
			south,
			east,
			north,
			reason: "geometry has no coordinates".to_string(),
		}
		.into());
	}
	Ok(LngLatBbox::new(west, south, east, north))
}

fn fold_geometry_coords(geometry: &geo_types::Geometry<f64>, f: &mut impl FnMut(f64, f64)) {
	use geo_types::Geometry;
	match geometry {
		Geometry::Point(p) => f(p.x(), p.y()),
		Geometry::MultiPoint(mp) => mp.iter().for_each(|p| f(p.x(), p.y())),
		Geometry::Line(l) => {
			f(l.start.x, l.start.y);
			f(l.end.x, l.end.y);
		}
		Geometry::LineString(ls) => ls.coords().for_each(|c| f(c.x, c.y)),
		Geometry::MultiLineString(mls) => mls.iter().for_each(|ls| ls.coords().for_each(|c| f(c.x, c.y))),
		Geometry::Polygon(poly) => {
			poly.exterior().coords().for_each(|c| f(c.x, c.y));
			poly.interiors().iter().for_each(|r| r.coords().for_each(|c| f(c.x, c.y)));
		}
		Geometry::MultiPolygon(mp) => mp.iter().for_each(|poly| {
			poly.exterior().coords().for_each(|c| f(c.x, c.y));
			poly.interiors().iter().for_each(|r| r.coords().for_each(|c| f(c.x, c.y)));
		}),
		Geometry::GeometryCollection(gc) => gc.iter().for_each(|g| fold_geometry_coords(g, f)),
		Geometry::Rect(r) => {
			f(r.min().x, r.min().y);
			f(r.max().x, r.max().y);
		}
		Geometry::Triangle(t) => {
			f(t.0.x, t.0.y);
			f(t.1.x, t.1.y);
			f(t.2.x, t.2.y);
		}
	}
}
