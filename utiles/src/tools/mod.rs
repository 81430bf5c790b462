//! One module per CLI sub-command; each exposes a clap `Subcommand` args
//! struct and a `run` function, matching the teacher's `tools::*` layout.

pub mod agg_hash;
pub mod bounding_tile;
pub mod burn;
pub mod children;
pub mod commands;
mod common;
pub mod cp;
pub mod edges;
pub mod info;
pub mod metadata;
pub mod neighbors;
pub mod parent;
pub mod quadkey;
pub mod rimraf;
pub mod shapes;
pub mod tiles;
pub mod touch;
pub mod update;
