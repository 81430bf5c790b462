//! `children [--depth N]`: the four subtiles of each input tile, or its
//! full descendant set at an absolute zoom when `--depth` is given.

use crate::stdin_stream::{read_values, write_value};
use crate::tools::common::tile_from_value;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct Subcommand {
	/// Expand recursively to this many levels below the input tile's zoom.
	#[arg(long)]
	pub depth: Option<u8>,

	#[arg(long)]
	pub seq: bool,
}

pub fn run(args: &Subcommand) -> Result<()> {
	let stdout = std::io::stdout();
	let mut out = stdout.lock();
	let stdin = std::io::stdin();

	for value in read_values(stdin.lock())? {
		let tile = tile_from_value(&value)?;
		let children = match args.depth {
			Some(depth) => tile.children_at(tile.z.saturating_add(depth))?,
			None => tile.children().to_vec(),
		};
		for child in children {
			write_value(&mut out, &serde_json::json!([child.x, child.y, child.z]), args.seq)?;
		}
	}
	Ok(())
}
