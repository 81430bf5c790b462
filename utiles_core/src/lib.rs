//! Tile algebra, geographic primitives and tile-payload sniffing.
//!
//! This crate has no knowledge of storage (MBTiles, directories) or
//! geometry rasterization — those live in `utiles_container` and
//! `utiles_geometry` respectively, both built on top of the [`Tile`] type
//! and functions defined here.

pub mod compression;
pub mod error;
pub mod format;
pub mod geo;
pub mod tile;

pub use error::UtilesError;
pub use format::{sniff, TileEncoding, TileFormat, TileType};
pub use geo::{Bbox, LngLat, LngLatBbox};
pub use tile::{bounding_tile, simplify, tile, tiles, tiles_list, Tile};
