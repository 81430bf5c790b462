//! `bounding-tile`: the single deepest tile containing every bbox/GeoJSON
//! read from stdin (or passed inline).

use crate::stdin_stream::{read_values, write_value};
use crate::tools::tiles::bboxes_from_value;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct Subcommand {
	/// `west south east north` bbox, taken in place of stdin.
	#[arg(num_args = 4, allow_negative_numbers = true)]
	pub bbox: Option<Vec<f64>>,

	#[arg(long)]
	pub seq: bool,
}

pub fn run(args: &Subcommand) -> Result<()> {
	let stdout = std::io::stdout();
	let mut out = stdout.lock();

	let bboxes = if let Some(b) = &args.bbox {
		vec![crate::tools::tiles::bbox_from_slice(b)?]
	} else {
		let stdin = std::io::stdin();
		let mut all = Vec::new();
		for value in read_values(stdin.lock())? {
			all.extend(bboxes_from_value(value)?);
		}
		all
	};

	for bbox in bboxes {
		let tile = utiles_core::bounding_tile(bbox, true)?;
		write_value(&mut out, &serde_json::json!([tile.x, tile.y, tile.z]), args.seq)?;
	}
	Ok(())
}
