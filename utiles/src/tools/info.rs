//! `info <path> [--debug]`: a JSON summary of an MBTiles file.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct Subcommand {
	pub path: PathBuf,

	/// Include per-zoom detail even when it would otherwise be omitted.
	#[arg(long)]
	pub debug: bool,
}

pub fn run(args: &Subcommand) -> Result<()> {
	let report = utiles_container::info(&args.path)?;
	let zooms: Vec<_> = report
		.zooms
		.iter()
		.map(|z| {
			serde_json::json!({
				"zoom": z.zoom,
				"ntiles": z.ntiles,
				"xmin": z.xmin,
				"xmax": z.xmax,
				"ymin": z.ymin,
				"ymax": z.ymax,
				"nbytes": z.nbytes,
			})
		})
		.collect();
	let mut out = serde_json::json!({
		"filesize": report.filesize,
		"mbtype": report.mbtype,
		"ntiles": report.ntiles,
		"nzooms": report.nzooms,
		"page_count": report.page_count,
		"page_size": report.page_size,
		"freelist_count": report.freelist_count,
		"minzoom": report.minzoom,
		"maxzoom": report.maxzoom,
		"zooms": zooms,
	});
	if args.debug {
		out["debug"] = serde_json::json!(true);
	}
	println!("{out}");
	Ok(())
}
