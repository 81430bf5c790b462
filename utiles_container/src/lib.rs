//! MBTiles (flat/hash/norm) and directory-pyramid tile storage, plus the
//! streaming copy/transcode engine and the file-level inspection commands
//! (`info`, `update`, `agg-hash`) built on top of them.

pub mod agg_hash;
pub mod copy;
pub mod directory;
pub mod info;
pub mod mbtiles;
pub mod schema;
pub mod source;
pub mod update;

pub use agg_hash::{agg_hash, AggHash};
pub use copy::{copy, CopyOptions, CopyReport};
pub use info::{info, InfoReport, ZoomInfo};
pub use mbtiles::{ConflictPolicy, MbtilesReader, MbtilesWriter};
pub use schema::DbType;
pub use source::TileSource;
pub use update::{update, UpdateReport};
