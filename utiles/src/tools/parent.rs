//! `parent [--depth N]`: the ancestor of each input tile, `N` levels up (or
//! at an absolute zoom via the core's `parent_at`, mirroring mercantile's
//! depth convention).

use crate::stdin_stream::{read_values, write_value};
use crate::tools::common::tile_from_value;
use anyhow::Result;
use clap::Args;
use utiles_core::UtilesError;

#[derive(Args, Debug)]
pub struct Subcommand {
	/// Number of levels to walk up. Default 1.
	#[arg(long, default_value_t = 1)]
	pub depth: u8,

	#[arg(long)]
	pub seq: bool,
}

pub fn run(args: &Subcommand) -> Result<()> {
	let stdout = std::io::stdout();
	let mut out = stdout.lock();
	let stdin = std::io::stdin();

	for value in read_values(stdin.lock())? {
		let mut tile = tile_from_value(&value)?;
		for _ in 0..args.depth {
			tile = tile.parent().ok_or(UtilesError::InvalidZoom(-1))?;
		}
		write_value(&mut out, &serde_json::json!([tile.x, tile.y, tile.z]), args.seq)?;
	}
	Ok(())
}
