//! Reads tiles and metadata out of an MBTiles file, transparently across
//! all three schemas: every schema exposes a `tiles` table or view with the
//! same four columns, so reads never need to know which one is underneath.

use crate::schema::{self, DbType};
use anyhow::{ensure, Context, Result};
use r2d2::Pool;
use r2d2_sqlite::rusqlite::OptionalExtension;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use std::sync::mpsc::{sync_channel, Receiver};
use std::thread::{self, JoinHandle};
use utiles_core::{sniff, Tile, TileType};

/// Channel depth for [`MbtilesReader::iter_tiles`]'s producer thread; bounds
/// how far SQL row fetching can read ahead of the consumer.
const ITER_CHANNEL_DEPTH: usize = 256;

/// A handle on an MBTiles SQLite database opened for reading.
pub struct MbtilesReader {
	pool: Pool<SqliteConnectionManager>,
	db_type: DbType,
}

impl MbtilesReader {
	/// Open an existing MBTiles file.
	pub fn open(path: &Path) -> Result<Self> {
		ensure!(path.exists(), "mbtiles file {path:?} does not exist");
		let manager = SqliteConnectionManager::file(path);
		let pool = Pool::builder().max_size(8).build(manager).context("opening mbtiles pool")?;
		let db_type = schema::detect(&pool)?;
		Ok(Self { pool, db_type })
	}

	#[must_use]
	pub fn db_type(&self) -> DbType {
		self.db_type
	}

	#[must_use]
	pub fn pool(&self) -> &Pool<SqliteConnectionManager> {
		&self.pool
	}

	/// Fetch a single tile's raw bytes, with the TMS y-flip applied at the
	/// SQL boundary (MBTiles stores rows bottom-up).
	pub fn get_tile(&self, tile: Tile) -> Result<Option<Vec<u8>>> {
		let conn = self.pool.get()?;
		let tms_y = tms_flip(tile);
		Ok(conn
			.query_row(
				"SELECT tile_data FROM tiles WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3",
				[i64::from(tile.z), i64::from(tile.x), i64::from(tms_y)],
				|row| row.get(0),
			)
			.optional()?)
	}

	/// Every tile in the database, in canonical `(z, y, x)` order.
	pub fn all_tiles(&self) -> Result<Vec<(Tile, Vec<u8>)>> {
		self.tiles_in(None, None)
	}

	/// Tiles restricted to a zoom range and/or tile-column/row bounding box
	/// (bbox already expressed as TMS column/row bounds), collected eagerly.
	pub fn tiles_in(
		&self,
		zoom_range: Option<(u8, u8)>,
		bbox_cols_rows: Option<(u32, u32, u32, u32)>,
	) -> Result<Vec<(Tile, Vec<u8>)>> {
		let mut out = self
			.iter_tiles(zoom_range, bbox_cols_rows)
			.map(|row| row.map(|(tile, data, _)| (tile, data)))
			.collect::<Result<Vec<_>>>()?;
		out.sort_by(|a, b| a.0.cmp(&b.0));
		Ok(out)
	}

	/// Stream tiles out of the database one row at a time instead of
	/// collecting them all up front, so a caller (e.g. `cp`) can hold at most
	/// a batch's worth of tile bytes in memory at any point. A background
	/// thread owns the SQL cursor and feeds rows through a bounded channel,
	/// since `rusqlite`'s row iterator borrows its statement and can't be
	/// handed back across the method boundary directly.
	pub fn iter_tiles(
		&self,
		zoom_range: Option<(u8, u8)>,
		bbox_cols_rows: Option<(u32, u32, u32, u32)>,
	) -> TileRowIter {
		let pool = self.pool.clone();
		let (tx, rx) = sync_channel(ITER_CHANNEL_DEPTH);
		let handle = thread::spawn(move || {
			let outcome: Result<()> = (|| {
				let conn = pool.get()?;
				let mut sql = "SELECT zoom_level, tile_column, tile_row, tile_data FROM tiles".to_string();
				let mut clauses = Vec::new();
				if let Some((z0, z1)) = zoom_range {
					clauses.push(format!("zoom_level BETWEEN {z0} AND {z1}"));
				}
				if let Some((x0, y0, x1, y1)) = bbox_cols_rows {
					clauses.push(format!(
						"tile_column BETWEEN {x0} AND {x1} AND tile_row BETWEEN {y0} AND {y1}"
					));
				}
				if !clauses.is_empty() {
					sql.push_str(" WHERE ");
					sql.push_str(&clauses.join(" AND "));
				}
				// TMS rows run bottom-up, so descending tile_row is ascending y.
				sql.push_str(" ORDER BY zoom_level ASC, tile_row DESC, tile_column ASC");
				let mut stmt = conn.prepare(&sql)?;
				let mut rows = stmt.query([])?;
				while let Some(row) = rows.next()? {
					let z: u8 = row.get(0)?;
					let x: u32 = row.get(1)?;
					let tms_y: u32 = row.get(2)?;
					let data: Vec<u8> = row.get(3)?;
					let y = (1u32 << z) - 1 - tms_y;
					let tile = Tile::new(x, y, z)?;
					let tile_type = sniff(&data);
					if tx.send(Ok((tile, data, tile_type))).is_err() {
						break;
					}
				}
				Ok(())
			})();
			if let Err(err) = outcome {
				let _ = tx.send(Err(err));
			}
		});
		TileRowIter {
			rx,
			_producer: handle,
		}
	}

	/// All `(name, value)` rows from the `metadata` table.
	pub fn metadata(&self) -> Result<Vec<(String, String)>> {
		let conn = self.pool.get()?;
		let mut stmt = conn.prepare("SELECT name, value FROM metadata")?;
		let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
		let mut out = Vec::new();
		for row in rows {
			out.push(row?);
		}
		Ok(out)
	}

	pub fn metadata_value(&self, name: &str) -> Result<Option<String>> {
		let conn = self.pool.get()?;
		Ok(conn
			.query_row("SELECT value FROM metadata WHERE name = ?1", [name], |row| row.get(0))
			.optional()?)
	}

	pub fn tile_count(&self) -> Result<i64> {
		let conn = self.pool.get()?;
		Ok(conn.query_row("SELECT COUNT(*) FROM tiles", [], |row| row.get(0))?)
	}

	pub fn zoom_range(&self) -> Result<Option<(u8, u8)>> {
		let conn = self.pool.get()?;
		let row: Option<(i64, i64)> = conn
			.query_row("SELECT MIN(zoom_level), MAX(zoom_level) FROM tiles", [], |r| {
				Ok((r.get(0)?, r.get(1)?))
			})
			.optional()?;
		Ok(row.map(|(a, b)| (a as u8, b as u8)))
	}
}

/// TMS row index for a tile's y: `2^z - 1 - y`.
fn tms_flip(tile: Tile) -> u32 {
	(1u32 << tile.z) - 1 - tile.y
}

/// Lazy handle on [`MbtilesReader::iter_tiles`]'s background query; dropping
/// it before exhaustion stops the producer thread on its next send.
pub struct TileRowIter {
	rx: Receiver<Result<(Tile, Vec<u8>, TileType)>>,
	_producer: JoinHandle<()>,
}

impl Iterator for TileRowIter {
	type Item = Result<(Tile, Vec<u8>, TileType)>;

	fn next(&mut self) -> Option<Self::Item> {
		self.rx.recv().ok()
	}
}
