//! Writes tiles and metadata into an MBTiles file, branching per-row on the
//! schema's table layout: `flat` inserts straight into `tiles`, `hash`
//! computes and stores a content hash, `norm` dedups through a
//! content-addressed `images` table joined by `map`.

use crate::schema::{self, DbType};
use anyhow::Result;
use md5::{Digest, Md5};
use r2d2::Pool;
use r2d2_sqlite::{rusqlite::params, SqliteConnectionManager};
use std::path::Path;
use utiles_core::{Tile, UtilesError};

/// How to handle an insert that collides with an existing `(z, x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ConflictPolicy {
	/// Let the unique-constraint violation propagate as an error.
	#[default]
	Throw,
	/// Keep the existing row; the new tile is silently dropped.
	Ignore,
	/// Overwrite the existing row.
	Replace,
}

/// A handle on an MBTiles SQLite database opened for writing.
pub struct MbtilesWriter {
	pool: Pool<SqliteConnectionManager>,
	db_type: DbType,
}

impl MbtilesWriter {
	/// Create a fresh MBTiles file with the given schema, or open an
	/// existing one for appending (schema is then auto-detected and
	/// `db_type`/`page_size` are ignored).
	pub fn create(path: &Path, db_type: DbType, page_size: Option<i64>) -> Result<Self> {
		let is_new = !path.exists();
		let manager = SqliteConnectionManager::file(path);
		let pool = Pool::builder().max_size(4).build(manager)?;
		let db_type = if is_new {
			schema::touch(&pool, db_type, page_size)?;
			db_type
		} else {
			schema::detect(&pool)?
		};
		Ok(Self { pool, db_type })
	}

	#[must_use]
	pub fn db_type(&self) -> DbType {
		self.db_type
	}

	pub fn set_metadata(&self, name: &str, value: &str) -> Result<()> {
		self.pool
			.get()?
			.execute("INSERT OR REPLACE INTO metadata (name, value) VALUES (?1, ?2)", params![name, value])?;
		Ok(())
	}

	/// Insert a single tile. Prefer [`MbtilesWriter::insert_tiles_batch`]
	/// for bulk loads; each call here is its own implicit transaction.
	pub fn insert_tile(&mut self, tile: Tile, data: &[u8], conflict: ConflictPolicy) -> Result<()> {
		let conn = self.pool.get()?;
		insert_one(&conn, self.db_type, tile, data, conflict)
	}

	/// Insert many tiles within a single transaction, the way the teacher's
	/// bulk-load path batches inserts to avoid one fsync per row.
	pub fn insert_tiles_batch(&mut self, tiles: &[(Tile, Vec<u8>)], conflict: ConflictPolicy) -> Result<usize> {
		let mut conn = self.pool.get()?;
		let tx = conn.transaction()?;
		let mut inserted = 0usize;
		for (tile, data) in tiles {
			match insert_one(&tx, self.db_type, *tile, data, conflict) {
				Ok(()) => inserted += 1,
				Err(e) if conflict == ConflictPolicy::Ignore => {
					log::debug!("ignoring insert failure for {tile:?}: {e}");
				}
				Err(e) => return Err(e),
			}
		}
		tx.commit()?;
		Ok(inserted)
	}

	/// Toggle `PRAGMA journal_mode=WAL` and `synchronous=NORMAL` for bulk
	/// loads; callers restore defaults via [`MbtilesWriter::finalize`].
	pub fn begin_bulk_load(&self) -> Result<()> {
		let conn = self.pool.get()?;
		conn.pragma_update(None, "journal_mode", "WAL")?;
		conn.pragma_update(None, "synchronous", "NORMAL")?;
		Ok(())
	}

	/// Restore durability pragmas after a bulk load completes.
	pub fn finalize(&self) -> Result<()> {
		let conn = self.pool.get()?;
		conn.pragma_update(None, "synchronous", "FULL")?;
		conn.execute_batch("VACUUM;")?;
		Ok(())
	}
}

fn insert_one(
	conn: &r2d2_sqlite::rusqlite::Connection,
	db_type: DbType,
	tile: Tile,
	data: &[u8],
	conflict: ConflictPolicy,
) -> Result<()> {
	let tms_y = (1i64 << tile.z) - 1 - i64::from(tile.y);
	let or_clause = match conflict {
		ConflictPolicy::Throw => "",
		ConflictPolicy::Ignore => "OR IGNORE ",
		ConflictPolicy::Replace => "OR REPLACE ",
	};

	match db_type {
		DbType::Flat => {
			let sql = format!(
				"INSERT {or_clause}INTO tiles (zoom_level, tile_column, tile_row, tile_data) VALUES (?1, ?2, ?3, ?4)"
			);
			conn.execute(&sql, params![i64::from(tile.z), i64::from(tile.x), tms_y, data])?;
		}
		DbType::Hash => {
			let hash = content_hash(data);
			let sql = format!(
				"INSERT {or_clause}INTO tiles_with_hash (zoom_level, tile_column, tile_row, tile_data, tile_hash) VALUES (?1, ?2, ?3, ?4, ?5)"
			);
			conn.execute(&sql, params![i64::from(tile.z), i64::from(tile.x), tms_y, data, hash])?;
		}
		DbType::Norm => {
			let tile_id = content_hash(data);
			conn.execute(
				"INSERT OR IGNORE INTO images (tile_id, tile_data) VALUES (?1, ?2)",
				params![tile_id, data],
			)?;
			let sql = format!(
				"INSERT {or_clause}INTO map (zoom_level, tile_column, tile_row, tile_id) VALUES (?1, ?2, ?3, ?4)"
			);
			conn.execute(&sql, params![i64::from(tile.z), i64::from(tile.x), tms_y, tile_id])?;
		}
	}
	Ok(())
}

/// Hex MD5 of a tile payload, used both as the norm schema's content key
/// and the hash schema's dedup column.
#[must_use]
pub fn content_hash(data: &[u8]) -> String {
	let mut hasher = Md5::new();
	hasher.update(data);
	hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
	use std::fmt::Write;
	let mut s = String::with_capacity(bytes.len() * 2);
	for b in bytes {
		write!(s, "{b:02x}").unwrap();
	}
	s
}

impl From<ConflictPolicy> for &'static str {
	fn from(c: ConflictPolicy) -> Self {
		match c {
			ConflictPolicy::Throw => "throw",
			ConflictPolicy::Ignore => "ignore",
			ConflictPolicy::Replace => "replace",
		}
	}
}

impl std::str::FromStr for ConflictPolicy {
	type Err = anyhow::Error;

	fn from_str(s: &str) -> Result<Self> {
		match s {
			"throw" => Ok(ConflictPolicy::Throw),
			"ignore" => Ok(ConflictPolicy::Ignore),
			"replace" => Ok(ConflictPolicy::Replace),
			other => Err(UtilesError::DecodeError(format!("unknown conflict policy {other:?}")).into()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_fs::NamedTempFile;

	#[test]
	fn hash_schema_dedups_identical_rows_to_same_hash() {
		let file = NamedTempFile::new("hash.mbtiles").unwrap();
		let mut writer = MbtilesWriter::create(&file, DbType::Hash, None).unwrap();
		writer
			.insert_tile(Tile::new(0, 0, 1).unwrap(), b"same-bytes", ConflictPolicy::Throw)
			.unwrap();
		writer
			.insert_tile(Tile::new(1, 0, 1).unwrap(), b"same-bytes", ConflictPolicy::Throw)
			.unwrap();
		assert_eq!(content_hash(b"same-bytes").len(), 32);
	}

	#[test]
	fn replace_conflict_overwrites_existing_tile() {
		let file = NamedTempFile::new("replace.mbtiles").unwrap();
		let mut writer = MbtilesWriter::create(&file, DbType::Flat, None).unwrap();
		let tile = Tile::new(0, 0, 1).unwrap();
		writer.insert_tile(tile, b"first", ConflictPolicy::Throw).unwrap();
		writer.insert_tile(tile, b"second", ConflictPolicy::Replace).unwrap();

		let reader = crate::mbtiles::MbtilesReader::open(&file).unwrap();
		assert_eq!(reader.get_tile(tile).unwrap().unwrap(), b"second");
	}

	#[test]
	fn throw_conflict_propagates_error() {
		let file = NamedTempFile::new("throw.mbtiles").unwrap();
		let mut writer = MbtilesWriter::create(&file, DbType::Flat, None).unwrap();
		let tile = Tile::new(0, 0, 1).unwrap();
		writer.insert_tile(tile, b"first", ConflictPolicy::Throw).unwrap();
		assert!(writer.insert_tile(tile, b"second", ConflictPolicy::Throw).is_err());
	}

	#[test]
	fn norm_schema_dedups_images_across_tiles() {
		let file = NamedTempFile::new("norm.mbtiles").unwrap();
		let mut writer = MbtilesWriter::create(&file, DbType::Norm, None).unwrap();
		writer
			.insert_tile(Tile::new(0, 0, 2).unwrap(), b"shared", ConflictPolicy::Throw)
			.unwrap();
		writer
			.insert_tile(Tile::new(1, 0, 2).unwrap(), b"shared", ConflictPolicy::Throw)
			.unwrap();
		let conn = writer.pool.get().unwrap();
		let count: i64 = conn.query_row("SELECT COUNT(*) FROM images", [], |r| r.get(0)).unwrap();
		assert_eq!(count, 1);
	}
}
