//! `metadata <path> [--obj]`: dump an MBTiles file's `metadata` table.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use utiles_container::MbtilesReader;

#[derive(Args, Debug)]
pub struct Subcommand {
	pub path: PathBuf,

	/// Emit a `{name: value}` object instead of an array of `{name, value}`.
	#[arg(long)]
	pub obj: bool,
}

pub fn run(args: &Subcommand) -> Result<()> {
	let reader = MbtilesReader::open(&args.path)?;
	let rows = reader.metadata()?;

	if args.obj {
		let map: serde_json::Map<String, serde_json::Value> =
			rows.into_iter().map(|(name, value)| (name, serde_json::Value::String(value))).collect();
		println!("{}", serde_json::Value::Object(map));
	} else {
		let arr: Vec<_> = rows.into_iter().map(|(name, value)| serde_json::json!({"name": name, "value": value})).collect();
		println!("{}", serde_json::Value::Array(arr));
	}
	Ok(())
}
