//! `neighbors`: the up-to-eight tiles adjacent to each input tile.

use crate::stdin_stream::{read_values, write_value};
use crate::tools::common::tile_from_value;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct Subcommand {
	#[arg(long)]
	pub seq: bool,
}

pub fn run(args: &Subcommand) -> Result<()> {
	let stdout = std::io::stdout();
	let mut out = stdout.lock();
	let stdin = std::io::stdin();

	for value in read_values(stdin.lock())? {
		let tile = tile_from_value(&value)?;
		for n in tile.neighbors() {
			write_value(&mut out, &serde_json::json!([n.x, n.y, n.z]), args.seq)?;
		}
	}
	Ok(())
}
