//! `commands`: list every subcommand this binary exposes, introspected
//! straight off the `clap::Command` tree rather than hand-maintained.

use anyhow::Result;
use clap::{Args, CommandFactory};

#[derive(Args, Debug)]
pub struct Subcommand {}

pub fn run(_args: &Subcommand) -> Result<()> {
	let root = crate::Cli::command();
	let entries: Vec<_> = root
		.get_subcommands()
		.map(|cmd| {
			serde_json::json!({
				"name": cmd.get_name(),
				"path": cmd.get_name(),
				"about": cmd.get_about().map(ToString::to_string),
			})
		})
		.collect();
	println!("{}", serde_json::Value::Array(entries));
	Ok(())
}
