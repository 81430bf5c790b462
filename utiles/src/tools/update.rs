//! `update <path>`: re-derive an MBTiles file's metadata row from its tiles.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct Subcommand {
	pub path: PathBuf,
}

pub fn run(args: &Subcommand) -> Result<()> {
	let report = utiles_container::update(&args.path)?;
	log::info!(
		"updated metadata: format={:?} minzoom={:?} maxzoom={:?}",
		report.format,
		report.minzoom,
		report.maxzoom
	);
	Ok(())
}
