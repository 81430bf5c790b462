use anyhow::Result;
use clap::Parser;
use utiles::{run, Cli};

fn main() {
	let cli = Cli::parse();

	env_logger::Builder::new().filter_level(cli.verbose.log_level_filter()).format_timestamp(None).init();

	if let Err(err) = run(&cli) {
		log::error!("{err:#}");
		let code = err.downcast_ref::<utiles_core::UtilesError>().map_or(1, utiles_core::UtilesError::exit_code);
		std::process::exit(code);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn try_parse(args: &[&str]) -> Result<Cli> {
		Cli::try_parse_from(args).map_err(Into::into)
	}

	#[test]
	fn parses_tiles_subcommand() {
		let cli = try_parse(&["utiles", "tiles", "9"]).unwrap();
		assert!(matches!(cli.command, utiles::Commands::Tiles(_)));
	}

	#[test]
	fn parses_bounding_tile_alias() {
		try_parse(&["utiles", "bounding-tile"]).unwrap();
	}

	#[test]
	fn rejects_unknown_subcommand() {
		assert!(try_parse(&["utiles", "frobnicate"]).is_err());
	}

	#[test]
	fn cp_parses_conflict_and_dbtype_flags() {
		let cli = try_parse(&["utiles", "cp", "a.mbtiles", "b.mbtiles", "--conflict", "ignore", "--dbtype", "hash"]).unwrap();
		let utiles::Commands::Cp(args) = cli.command else {
			panic!("expected Cp");
		};
		assert_eq!(args.conflict, utiles_container::ConflictPolicy::Ignore);
		assert_eq!(args.dbtype, utiles_container::DbType::Hash);
	}
}
