//! The `utiles`/`ut` CLI: a thin dispatcher over `utiles_core`,
//! `utiles_geometry`, and `utiles_container`. Stdin parsing lives in
//! `stdin_stream`; one module per sub-command lives under `tools`.

pub mod stdin_stream;
pub mod tools;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{ErrorLevel, Verbosity};

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about = "A toolbox for tile algebra, tile cover, and MBTiles-family storage.",
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true
)]
pub struct Cli {
	#[command(subcommand)]
	pub command: Commands,

	#[command(flatten)]
	pub verbose: Verbosity<ErrorLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Cover a bbox or GeoJSON with tiles at a zoom level
	Tiles(tools::tiles::Subcommand),
	/// The deepest tile containing a bbox or GeoJSON
	#[clap(name = "bounding-tile")]
	BoundingTile(tools::bounding_tile::Subcommand),
	/// The ancestor tile of each input tile
	Parent(tools::parent::Subcommand),
	/// The subtiles of each input tile
	Children(tools::children::Subcommand),
	/// The up-to-eight adjacent tiles of each input tile
	Neighbors(tools::neighbors::Subcommand),
	/// Convert between tile triples and quadkeys
	Quadkey(tools::quadkey::Subcommand),
	/// Render tiles as GeoJSON
	Shapes(tools::shapes::Subcommand),
	/// Cover GeoJSON with tiles at a single zoom
	Burn(tools::burn::Subcommand),
	/// The outer-boundary subset of a tile set
	Edges(tools::edges::Subcommand),
	/// Create an empty MBTiles file with a given schema
	Touch(tools::touch::Subcommand),
	/// Print a JSON summary of an MBTiles file
	Info(tools::info::Subcommand),
	/// Print an MBTiles file's metadata table
	Metadata(tools::metadata::Subcommand),
	/// Re-derive an MBTiles file's metadata from its tiles
	Update(tools::update::Subcommand),
	/// Copy/transcode tiles between an MBTiles file and a directory pyramid
	#[clap(alias = "copy")]
	Cp(tools::cp::Subcommand),
	/// A single content hash over an entire tile set
	#[clap(name = "agg-hash")]
	AggHash(tools::agg_hash::Subcommand),
	/// Recursively remove a directory pyramid
	Rimraf(tools::rimraf::Subcommand),
	/// List every sub-command this binary exposes
	Commands(tools::commands::Subcommand),
}

pub fn run(cli: &Cli) -> anyhow::Result<()> {
	match &cli.command {
		Commands::Tiles(args) => tools::tiles::run(args),
		Commands::BoundingTile(args) => tools::bounding_tile::run(args),
		Commands::Parent(args) => tools::parent::run(args),
		Commands::Children(args) => tools::children::run(args),
		Commands::Neighbors(args) => tools::neighbors::run(args),
		Commands::Quadkey(args) => tools::quadkey::run(args),
		Commands::Shapes(args) => tools::shapes::run(args),
		Commands::Burn(args) => tools::burn::run(args),
		Commands::Edges(args) => tools::edges::run(args),
		Commands::Touch(args) => tools::touch::run(args),
		Commands::Info(args) => tools::info::run(args),
		Commands::Metadata(args) => tools::metadata::run(args),
		Commands::Update(args) => tools::update::run(args),
		Commands::Cp(args) => tools::cp::run(args),
		Commands::AggHash(args) => tools::agg_hash::run(args),
		Commands::Rimraf(args) => tools::rimraf::run(args),
		Commands::Commands(args) => tools::commands::run(args),
	}
}
