//! `rimraf <dir>`: recursively remove a directory pyramid.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct Subcommand {
	pub dir: PathBuf,
}

pub fn run(args: &Subcommand) -> Result<()> {
	utiles_container::directory::rimraf(&args.dir)
}
