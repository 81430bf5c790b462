//! `burn Z`: cover every GeoJSON geometry read from stdin at a single zoom.

use crate::stdin_stream::read_values;
use crate::stdin_stream::StdinValue;
use anyhow::{anyhow, Result};
use clap::Args;
use std::io::Write;

#[derive(Args, Debug)]
pub struct Subcommand {
	pub zoom: u8,

	#[arg(long)]
	pub seq: bool,
}

pub fn run(args: &Subcommand) -> Result<()> {
	let stdin = std::io::stdin();
	let stdout = std::io::stdout();
	let mut out = stdout.lock();

	for value in read_values(stdin.lock())? {
		let StdinValue::Object(json) = value else {
			return Err(anyhow!("burn expects GeoJSON input"));
		};
		let parsed = utiles_geometry::parse_geojson(&json.to_string())?;
		let tiles = utiles_geometry::cover_all(parsed.geometries.iter(), args.zoom)?;
		for tile in tiles {
			crate::stdin_stream::write_value(&mut out, &serde_json::json!([tile.x, tile.y, tile.z]), args.seq)?;
		}
	}
	Ok(())
}
