//! `edges`: the outer-boundary subset of a tile set read from stdin.

use crate::stdin_stream::read_values;
use crate::tools::common::tile_from_value;
use anyhow::Result;
use clap::Args;
use std::collections::BTreeSet;
use std::io::Write;

#[derive(Args, Debug)]
pub struct Subcommand {}

pub fn run(_args: &Subcommand) -> Result<()> {
	let stdin = std::io::stdin();
	let tiles: BTreeSet<_> = read_values(stdin.lock())?
		.iter()
		.map(tile_from_value)
		.collect::<Result<_>>()?;

	let stdout = std::io::stdout();
	let mut out = stdout.lock();
	for tile in utiles_geometry::edges(&tiles) {
		writeln!(out, "{}", serde_json::json!([tile.x, tile.y, tile.z]))?;
	}
	Ok(())
}
