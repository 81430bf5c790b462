//! `shapes [--precision P] [--mercator] [--bbox|--feature] [--collect] [--extents] [--buffer B] [--seq]`:
//! render each input tile as GeoJSON.

use crate::stdin_stream::{read_values, write_value};
use crate::tools::common::tile_from_value;
use anyhow::Result;
use clap::Args;
use std::io::Write;
use utiles_geometry::{bbox_array, shape, shapes_collection, ShapeOptions};

#[derive(Args, Debug)]
pub struct Subcommand {
	#[arg(long)]
	pub precision: Option<u8>,

	#[arg(long)]
	pub mercator: bool,

	/// Emit a bare `[west, south, east, north]` array instead of a polygon feature.
	#[arg(long, conflicts_with = "feature")]
	pub bbox: bool,

	/// Emit a GeoJSON Feature (the default; accepted for symmetry with `--bbox`).
	#[arg(long)]
	pub feature: bool,

	/// Gather every tile into one `FeatureCollection` instead of one feature per line.
	#[arg(long)]
	pub collect: bool,

	/// Only report `{x, y, z}` extents, no geometry.
	#[arg(long)]
	pub extents: bool,

	#[arg(long, default_value_t = 0.0)]
	pub buffer: f64,

	#[arg(long)]
	pub seq: bool,
}

pub fn run(args: &Subcommand) -> Result<()> {
	let stdin = std::io::stdin();
	let tiles: Vec<_> = read_values(stdin.lock())?
		.iter()
		.map(tile_from_value)
		.collect::<Result<_>>()?;

	let opts = ShapeOptions {
		precision: args.precision,
		mercator: args.mercator,
		bbox: args.bbox,
		buffer: args.buffer,
	};

	let stdout = std::io::stdout();
	let mut out = stdout.lock();

	if args.extents {
		for tile in tiles {
			writeln!(out, "{}", serde_json::json!({"x": tile.x, "y": tile.y, "z": tile.z}))?;
		}
		return Ok(());
	}

	if args.bbox {
		for tile in tiles {
			write_value(&mut out, &serde_json::json!(bbox_array(tile, opts)), args.seq)?;
		}
		return Ok(());
	}

	if args.collect {
		let collection = shapes_collection(tiles, opts);
		serde_json::to_writer(&mut out, &collection)?;
		writeln!(out)?;
		return Ok(());
	}

	for tile in tiles {
		let feature = shape(tile, opts);
		write_value(&mut out, &serde_json::to_value(&feature)?, args.seq)?;
	}
	Ok(())
}
