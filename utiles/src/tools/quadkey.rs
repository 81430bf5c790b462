//! `quadkey`: convert tile triples to quadkeys and quadkeys back to tile
//! triples, dispatching on which one stdin handed us.

use crate::stdin_stream::read_values;
use crate::stdin_stream::StdinValue;
use crate::tools::common::BAD_TILE;
use anyhow::Result;
use clap::Args;
use std::io::Write;
use utiles_core::Tile;

#[derive(Args, Debug)]
pub struct Subcommand {}

pub fn run(_args: &Subcommand) -> Result<()> {
	let stdout = std::io::stdout();
	let mut out = stdout.lock();
	let stdin = std::io::stdin();

	for value in read_values(stdin.lock())? {
		match value {
			StdinValue::Quadkey(q) => {
				let tile = Tile::from_quadkey(&q)?;
				writeln!(out, "{}", serde_json::json!([tile.x, tile.y, tile.z]))?;
			}
			StdinValue::Array(json) => {
				let nums: Vec<i64> = serde_json::from_value(json)?;
				let [x, y, z] = nums.as_slice() else {
					return Err(BAD_TILE.into());
				};
				let tile = Tile::new(*x as u32, *y as u32, *z as u8)?;
				writeln!(out, "{}", tile.quadkey())?;
			}
			StdinValue::Object(_) => return Err(BAD_TILE.into()),
		}
	}
	Ok(())
}
