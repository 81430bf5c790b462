//! The `cp` copy/transcode engine: stream tiles out of one source and into
//! another, filtered by zoom/bbox, resolving write conflicts per policy.
//!
//! Tiles are pulled lazily, one at a time, out of the source's
//! [`TileSource::iter_tiles`] and handed to a single writer thread owning
//! the destination connection over a bounded channel — this keeps exactly
//! one thread touching the destination at a time (SQLite write transactions
//! don't parallelize), and keeps peak memory bounded by the channel depth
//! and the writer's batch size rather than the total tile count.

use crate::directory::{DirectoryReader, DirectoryWriter};
use crate::mbtiles::{ConflictPolicy, MbtilesReader, MbtilesWriter};
use crate::schema::DbType;
use crate::source::TileSource;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::mpsc::sync_channel;
use std::thread;
use utiles_core::{LngLatBbox, Tile};

/// Channel depth between the producer and writer threads; bounds how far
/// the producer can read ahead of the writer.
const CHANNEL_DEPTH: usize = 256;
/// Tiles per write transaction.
const BATCH_SIZE: usize = 1000;

/// Filters and policy for a `cp` run.
#[derive(Debug, Clone, Default)]
pub struct CopyOptions {
	pub zoom_range: Option<(u8, u8)>,
	pub bbox: Option<LngLatBbox>,
	pub conflict: ConflictPolicy,
	pub dst_db_type: DbType,
	pub dst_page_size: Option<i64>,
}

/// Summary of a completed copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyReport {
	pub tiles_seen: usize,
	pub tiles_written: usize,
}

/// Copy every tile from `src` (MBTiles file or directory pyramid) into
/// `dst`, creating it if necessary. `dst` is treated as an MBTiles file
/// when it has a `.mbtiles` extension, and as a directory pyramid
/// otherwise.
pub fn copy(src: &Path, dst: &Path, opts: CopyOptions) -> Result<CopyReport> {
	let source = TileSource::open(src).with_context(|| format!("opening source {src:?}"))?;

	let (tx, rx) = sync_channel::<(Tile, Vec<u8>)>(CHANNEL_DEPTH);
	let dst_is_mbtiles = dst.extension().and_then(|e| e.to_str()) == Some("mbtiles");
	let dst_path: PathBuf = dst.to_path_buf();
	let conflict = opts.conflict;
	let db_type = opts.dst_db_type;
	let page_size = opts.dst_page_size;

	let writer_handle = thread::spawn(move || -> Result<usize> {
		let mut written = 0usize;
		if dst_is_mbtiles {
			let mut writer = MbtilesWriter::create(&dst_path, db_type, page_size)?;
			writer.begin_bulk_load()?;
			let mut batch = Vec::with_capacity(BATCH_SIZE);
			while let Ok(item) = rx.recv() {
				batch.push(item);
				if batch.len() >= BATCH_SIZE {
					written += writer.insert_tiles_batch(&batch, conflict)?;
					batch.clear();
				}
			}
			if !batch.is_empty() {
				written += writer.insert_tiles_batch(&batch, conflict)?;
			}
			writer.finalize()?;
		} else {
			let writer = DirectoryWriter::new(dst_path);
			while let Ok((tile, data)) = rx.recv() {
				let format = utiles_core::sniff(&data).format;
				writer.write_tile(tile, &data, format)?;
				written += 1;
			}
		}
		Ok(written)
	});

	// Pull tiles out of the source lazily and hand them straight to the
	// writer thread: peak memory is bounded by the channel depth and the
	// writer's own batch size, not by the total tile count.
	let mut tiles_seen = 0usize;
	for row in source.iter_tiles() {
		let (tile, data, _tile_type) = row?;
		if !passes_filters(tile, &opts) {
			continue;
		}
		tiles_seen += 1;
		tx.send((tile, data)).context("sending tile to writer thread")?;
	}
	drop(tx);

	let tiles_written = writer_handle
		.join()
		.map_err(|_| anyhow::anyhow!("copy writer thread panicked"))??;

	Ok(CopyReport {
		tiles_seen,
		tiles_written,
	})
}

fn passes_filters(tile: Tile, opts: &CopyOptions) -> bool {
	if let Some((z0, z1)) = opts.zoom_range {
		if tile.z < z0 || tile.z > z1 {
			return false;
		}
	}
	if let Some(bbox) = &opts.bbox {
		let tb = tile.bounds();
		let overlaps = tb.west < bbox.east && tb.east > bbox.west && tb.south < bbox.north && tb.north > bbox.south;
		if !overlaps {
			return false;
		}
	}
	true
}

/// Re-open a path as a [`MbtilesReader`] for callers (e.g. `info`) that
/// specifically need MBTiles introspection rather than the source-agnostic
/// [`TileSource`] view.
pub fn open_mbtiles(path: &Path) -> Result<MbtilesReader> {
	MbtilesReader::open(path)
}

/// Re-open a path as a [`DirectoryReader`].
pub fn open_directory(path: &Path) -> Result<DirectoryReader> {
	DirectoryReader::open(path)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mbtiles::MbtilesWriter;
	use assert_fs::NamedTempFile;

	#[test]
	fn copies_all_tiles_between_mbtiles_files() {
		let src_file = NamedTempFile::new("src.mbtiles").unwrap();
		let mut writer = MbtilesWriter::create(&src_file, DbType::Flat, None).unwrap();
		for i in 0..4u32 {
			writer
				.insert_tile(Tile::new(i, 0, 2).unwrap(), b"payload", ConflictPolicy::Throw)
				.unwrap();
		}
		drop(writer);

		let dst_file = NamedTempFile::new("dst.mbtiles").unwrap();
		let report = copy(&src_file, &dst_file, CopyOptions::default()).unwrap();
		assert_eq!(report.tiles_seen, 4);
		assert_eq!(report.tiles_written, 4);

		let reader = MbtilesReader::open(&dst_file).unwrap();
		assert_eq!(reader.tile_count().unwrap(), 4);
	}

	#[test]
	fn zoom_filter_excludes_other_levels() {
		let src_file = NamedTempFile::new("src2.mbtiles").unwrap();
		let mut writer = MbtilesWriter::create(&src_file, DbType::Flat, None).unwrap();
		writer
			.insert_tile(Tile::new(0, 0, 1).unwrap(), b"a", ConflictPolicy::Throw)
			.unwrap();
		writer
			.insert_tile(Tile::new(0, 0, 2).unwrap(), b"b", ConflictPolicy::Throw)
			.unwrap();
		drop(writer);

		let dst_file = NamedTempFile::new("dst2.mbtiles").unwrap();
		let opts = CopyOptions {
			zoom_range: Some((2, 2)),
			..Default::default()
		};
		let report = copy(&src_file, &dst_file, opts).unwrap();
		assert_eq!(report.tiles_written, 1);
	}

	/// Every tile of the complete world pyramid from z0 through z4: `4^z`
	/// tiles per level, `1+4+16+64+256 = 341` tiles total.
	fn full_world_pyramid(path: &Path) {
		let mut writer = MbtilesWriter::create(path, DbType::Flat, None).unwrap();
		for z in 0..=4u8 {
			for y in 0..(1u32 << z) {
				for x in 0..(1u32 << z) {
					let data = format!("payload-{x}-{y}-{z}");
					writer
						.insert_tile(Tile::new(x, y, z).unwrap(), data.as_bytes(), ConflictPolicy::Throw)
						.unwrap();
				}
			}
		}
	}

	#[test]
	fn zoom_ranged_copy_then_backfill_reaches_the_full_pyramid() {
		let src_file = NamedTempFile::new("world.mbtiles").unwrap();
		full_world_pyramid(&src_file);

		let dst_file = NamedTempFile::new("world_out.mbtiles").unwrap();
		let high = copy(
			&src_file,
			&dst_file,
			CopyOptions {
				zoom_range: Some((3, 4)),
				..Default::default()
			},
		)
		.unwrap();
		assert_eq!(high.tiles_written, 4usize.pow(3) + 4usize.pow(4));
		assert_eq!(high.tiles_written, 320);

		let low = copy(
			&src_file,
			&dst_file,
			CopyOptions {
				zoom_range: Some((0, 2)),
				..Default::default()
			},
		)
		.unwrap();
		assert_eq!(low.tiles_written, 21);

		let reader = MbtilesReader::open(&dst_file).unwrap();
		assert_eq!(reader.tile_count().unwrap(), 341);

		let overlap = copy(
			&src_file,
			&dst_file,
			CopyOptions {
				zoom_range: Some((3, 4)),
				..Default::default()
			},
		);
		assert!(overlap.is_err(), "re-copying the same tiles under Throw must conflict");
	}

	#[test]
	fn bbox_filter_on_half_the_world_keeps_half_the_zoom_ranged_tiles() {
		let src_file = NamedTempFile::new("world2.mbtiles").unwrap();
		full_world_pyramid(&src_file);

		let dst_file = NamedTempFile::new("world2_out.mbtiles").unwrap();
		let report = copy(
			&src_file,
			&dst_file,
			CopyOptions {
				zoom_range: Some((3, 4)),
				bbox: Some(LngLatBbox::new(-180.0, -90.0, 0.0, 90.0)),
				..Default::default()
			},
		)
		.unwrap();
		assert_eq!(report.tiles_written, (4usize.pow(3) + 4usize.pow(4)) / 2);
	}
}
