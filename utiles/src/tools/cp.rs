//! `cp <src> <dst> [--dbtype …] [--stream] [--minzoom N] [--maxzoom N] [--bbox …] [--conflict throw|ignore|replace]`

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use utiles_container::{ConflictPolicy, CopyOptions, DbType};

#[derive(Args, Debug)]
pub struct Subcommand {
	pub src: PathBuf,
	pub dst: PathBuf,

	#[arg(long, value_enum, default_value = "flat")]
	pub dbtype: DbType,

	/// Accepted for parity with the input contract; the copy engine always
	/// streams tiles through a bounded producer/writer channel.
	#[arg(long)]
	pub stream: bool,

	#[arg(long)]
	pub minzoom: Option<u8>,

	#[arg(long)]
	pub maxzoom: Option<u8>,

	#[arg(long, num_args = 4, allow_negative_numbers = true)]
	pub bbox: Option<Vec<f64>>,

	#[arg(long, value_enum, default_value = "throw")]
	pub conflict: ConflictPolicy,

	#[arg(long)]
	pub page_size: Option<i64>,
}

pub fn run(args: &Subcommand) -> Result<()> {
	let zoom_range = match (args.minzoom, args.maxzoom) {
		(Some(lo), Some(hi)) => Some((lo, hi)),
		(Some(lo), None) => Some((lo, u8::MAX)),
		(None, Some(hi)) => Some((0, hi)),
		(None, None) => None,
	};
	let bbox = args.bbox.as_deref().map(crate::tools::tiles::bbox_from_slice).transpose()?;

	let opts = CopyOptions {
		zoom_range,
		bbox,
		conflict: args.conflict,
		dst_db_type: args.dbtype,
		dst_page_size: args.page_size,
	};
	let report = utiles_container::copy(&args.src, &args.dst, opts)?;
	log::info!("copied {}/{} tiles", report.tiles_written, report.tiles_seen);
	Ok(())
}
