//! MBTiles schema definitions: the three table layouts the format allows
//! (`flat`, `hash`, `norm`), schema creation (`touch`), and schema
//! auto-detection by introspecting `sqlite_master`.

use anyhow::Result;
use r2d2::Pool;
use r2d2_sqlite::{rusqlite::OptionalExtension, SqliteConnectionManager};
use utiles_core::UtilesError;

/// The MBTiles `application_id` pragma utiles stamps onto every database it
/// creates, so a foreign tool (or `file(1)`) can recognize the format.
pub const APPLICATION_ID: i32 = 0x4D50_4258_u32 as i32;
/// Schema generation utiles writes; bumped if the table layout ever changes.
pub const USER_VERSION: i32 = 3;
const DEFAULT_PAGE_SIZE: i64 = 4096;

/// Which of the three MBTiles table layouts a database uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum DbType {
	/// `tiles(zoom_level, tile_column, tile_row, tile_data)`, no dedup.
	#[default]
	Flat,
	/// `tiles_with_hash(..., tile_hash)` plus a `tiles` view; tiles are
	/// deduplicated by content hash within the single table.
	Hash,
	/// `map(zoom_level, tile_column, tile_row, tile_id)` joined against
	/// `images(tile_id, tile_data)` through a `tiles` view; the classic
	/// normalized MBTiles layout.
	#[cfg_attr(feature = "cli", value(alias = "normalized"))]
	Norm,
}

impl DbType {
	#[must_use]
	pub fn as_str(&self) -> &'static str {
		match self {
			DbType::Flat => "flat",
			DbType::Hash => "hash",
			DbType::Norm => "norm",
		}
	}
}

impl std::str::FromStr for DbType {
	type Err = anyhow::Error;

	fn from_str(s: &str) -> Result<Self> {
		match s {
			"flat" => Ok(DbType::Flat),
			"hash" => Ok(DbType::Hash),
			"norm" | "normalized" => Ok(DbType::Norm),
			other => Err(UtilesError::DecodeError(format!("unknown mbtiles schema {other:?}")).into()),
		}
	}
}

/// Create the tables, indices and views for `db_type` on a pool pointed at
/// a fresh (or empty) database file, stamping the pragmas described in the
/// format. `page_size` must be set before any table is created; SQLite
/// ignores later attempts to change it.
pub fn touch(pool: &Pool<SqliteConnectionManager>, db_type: DbType, page_size: Option<i64>) -> Result<()> {
	let conn = pool.get()?;
	conn.pragma_update(None, "page_size", page_size.unwrap_or(DEFAULT_PAGE_SIZE))?;
	conn.pragma_update(None, "application_id", APPLICATION_ID)?;
	conn.pragma_update(None, "user_version", USER_VERSION)?;

	let ddl = match db_type {
		DbType::Flat => {
			"CREATE TABLE metadata (name TEXT, value TEXT, UNIQUE (name));
			 CREATE TABLE tiles (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_data BLOB);
			 CREATE UNIQUE INDEX tile_index ON tiles (zoom_level, tile_column, tile_row);"
		}
		DbType::Hash => {
			"CREATE TABLE metadata (name TEXT, value TEXT, UNIQUE (name));
			 CREATE TABLE tiles_with_hash (
			   zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER,
			   tile_data BLOB, tile_hash TEXT
			 );
			 CREATE UNIQUE INDEX tiles_with_hash_index ON tiles_with_hash (zoom_level, tile_column, tile_row);
			 CREATE INDEX tiles_with_hash_hash_index ON tiles_with_hash (tile_hash);
			 CREATE VIEW tiles AS
			   SELECT zoom_level, tile_column, tile_row, tile_data FROM tiles_with_hash;"
		}
		DbType::Norm => {
			"CREATE TABLE metadata (name TEXT, value TEXT, UNIQUE (name));
			 CREATE TABLE map (
			   zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_id TEXT
			 );
			 CREATE TABLE images (tile_id TEXT, tile_data BLOB);
			 CREATE UNIQUE INDEX map_index ON map (zoom_level, tile_column, tile_row);
			 CREATE UNIQUE INDEX images_id_index ON images (tile_id);
			 CREATE VIEW tiles AS
			   SELECT map.zoom_level AS zoom_level, map.tile_column AS tile_column,
			          map.tile_row AS tile_row, images.tile_data AS tile_data
			   FROM map JOIN images ON map.tile_id = images.tile_id;"
		}
	};
	conn.execute_batch(ddl)?;
	Ok(())
}

/// Auto-detect which schema an already-populated MBTiles file uses by
/// inspecting `sqlite_master`.
pub fn detect(pool: &Pool<SqliteConnectionManager>) -> Result<DbType> {
	let conn = pool.get()?;
	let has_table = |name: &str| -> Result<bool> {
		Ok(conn
			.query_row(
				"SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
				[name],
				|_| Ok(()),
			)
			.optional()?
			.is_some())
	};

	if has_table("tiles_with_hash")? {
		return Ok(DbType::Hash);
	}
	if has_table("map")? && has_table("images")? {
		return Ok(DbType::Norm);
	}
	if has_table("tiles")? {
		return Ok(DbType::Flat);
	}
	Err(UtilesError::NotFound("no recognizable mbtiles schema (tiles/map+images/tiles_with_hash)".into()).into())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	#[test]
	fn parses_schema_names() {
		assert_eq!(DbType::from_str("flat").unwrap(), DbType::Flat);
		assert_eq!(DbType::from_str("hash").unwrap(), DbType::Hash);
		assert_eq!(DbType::from_str("norm").unwrap(), DbType::Norm);
		assert!(DbType::from_str("bogus").is_err());
	}

	#[test]
	fn touch_and_detect_each_schema() {
		for (db_type, _) in [(DbType::Flat, "flat"), (DbType::Hash, "hash"), (DbType::Norm, "norm")] {
			let manager = SqliteConnectionManager::memory();
			let pool = Pool::builder().max_size(1).build(manager).unwrap();
			touch(&pool, db_type, None).unwrap();
			assert_eq!(detect(&pool).unwrap(), db_type);
		}
	}

	#[test]
	fn touch_sets_page_size() {
		let manager = SqliteConnectionManager::memory();
		let pool = Pool::builder().max_size(1).build(manager).unwrap();
		touch(&pool, DbType::Flat, Some(512)).unwrap();
		let conn = pool.get().unwrap();
		let page_size: i64 = conn.pragma_query_value(None, "page_size", |r| r.get(0)).unwrap();
		assert_eq!(page_size, 512);
	}
}
