//! `agg-hash <path> [--bbox …]`: one MD5 digest over an entire tile set.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct Subcommand {
	pub path: PathBuf,

	#[arg(long, num_args = 4, allow_negative_numbers = true)]
	pub bbox: Option<Vec<f64>>,
}

pub fn run(args: &Subcommand) -> Result<()> {
	let bbox = args.bbox.as_deref().map(crate::tools::tiles::bbox_from_slice).transpose()?;
	let report = utiles_container::agg_hash(&args.path, bbox)?;
	println!("{}", serde_json::json!({"hash": report.hash, "ntiles": report.ntiles}));
	Ok(())
}
