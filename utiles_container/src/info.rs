//! `info`: a structured summary of an MBTiles file — size, schema, SQLite
//! page accounting, and per-zoom tile/byte counts.

use crate::mbtiles::MbtilesReader;
use anyhow::Result;
use std::path::Path;

/// Per-zoom statistics.
#[derive(Debug, Clone)]
pub struct ZoomInfo {
	pub zoom: u8,
	pub ntiles: i64,
	pub xmin: u32,
	pub xmax: u32,
	pub ymin: u32,
	pub ymax: u32,
	pub nbytes: i64,
}

/// The full `info` report for an MBTiles file.
#[derive(Debug, Clone)]
pub struct InfoReport {
	pub filesize: u64,
	pub mbtype: &'static str,
	pub ntiles: i64,
	pub nzooms: usize,
	pub page_count: i64,
	pub page_size: i64,
	pub freelist_count: i64,
	pub minzoom: Option<u8>,
	pub maxzoom: Option<u8>,
	pub zooms: Vec<ZoomInfo>,
}

/// Gather an [`InfoReport`] for the MBTiles file at `path`.
pub fn info(path: &Path) -> Result<InfoReport> {
	let filesize = std::fs::metadata(path)?.len();
	let reader = MbtilesReader::open(path)?;
	let conn = reader.pool().get()?;

	let page_count: i64 = conn.pragma_query_value(None, "page_count", |r| r.get(0))?;
	let page_size: i64 = conn.pragma_query_value(None, "page_size", |r| r.get(0))?;
	let freelist_count: i64 = conn.pragma_query_value(None, "freelist_count", |r| r.get(0))?;
	let ntiles = reader.tile_count()?;
	let zoom_range = reader.zoom_range()?;

	let mut zooms = Vec::new();
	if let Some((z0, z1)) = zoom_range {
		for z in z0..=z1 {
			let row: Option<(i64, i64, i64, i64, i64, i64)> = conn
				.query_row(
					"SELECT COUNT(*), MIN(tile_column), MAX(tile_column), MIN(tile_row), MAX(tile_row), COALESCE(SUM(LENGTH(tile_data)), 0)
					 FROM tiles WHERE zoom_level = ?1",
					[i64::from(z)],
					|r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?)),
				)
				.ok();
			if let Some((count, xmin, xmax, ymin_tms, ymax_tms, nbytes)) = row {
				if count > 0 {
					let max_index = (1i64 << z) - 1;
					zooms.push(ZoomInfo {
						zoom: z,
						ntiles: count,
						xmin: xmin as u32,
						xmax: xmax as u32,
						ymin: (max_index - ymax_tms) as u32,
						ymax: (max_index - ymin_tms) as u32,
						nbytes,
					});
				}
			}
		}
	}

	Ok(InfoReport {
		filesize,
		mbtype: mbtype_str(reader.db_type()),
		ntiles,
		nzooms: zooms.len(),
		page_count,
		page_size,
		freelist_count,
		minzoom: zoom_range.map(|(a, _)| a),
		maxzoom: zoom_range.map(|(_, b)| b),
		zooms,
	})
}

fn mbtype_str(db_type: crate::schema::DbType) -> &'static str {
	db_type.as_str()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mbtiles::{ConflictPolicy, MbtilesWriter};
	use crate::schema::DbType;
	use assert_fs::NamedTempFile;
	use utiles_core::Tile;

	#[test]
	fn reports_page_size_and_tile_counts() {
		let file = NamedTempFile::new("info.mbtiles").unwrap();
		let mut writer = MbtilesWriter::create(&file, DbType::Flat, Some(1024)).unwrap();
		writer.insert_tile(Tile::new(0, 0, 1).unwrap(), b"abcd", ConflictPolicy::Throw).unwrap();
		writer.insert_tile(Tile::new(1, 0, 1).unwrap(), b"ef", ConflictPolicy::Throw).unwrap();
		drop(writer);

		let report = info(&file).unwrap();
		assert_eq!(report.ntiles, 2);
		assert_eq!(report.page_size, 1024);
		assert_eq!(report.minzoom, Some(1));
		assert_eq!(report.maxzoom, Some(1));
		assert_eq!(report.zooms.len(), 1);
		assert_eq!(report.zooms[0].nbytes, 6);
	}
}
