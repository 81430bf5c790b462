//! `touch <path> [--db-type flat|hash|norm] [--page-size N]`: create an
//! empty MBTiles file with the requested schema, or no-op if it exists.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use utiles_container::{DbType, MbtilesWriter};

#[derive(Args, Debug)]
pub struct Subcommand {
	pub path: PathBuf,

	#[arg(long, value_enum, default_value = "flat")]
	pub db_type: DbType,

	#[arg(long)]
	pub page_size: Option<i64>,
}

pub fn run(args: &Subcommand) -> Result<()> {
	MbtilesWriter::create(&args.path, args.db_type, args.page_size)?;
	Ok(())
}
