//! `update`: re-derive an MBTiles file's metadata row from its actual tile
//! contents, for files whose metadata table is missing, stale, or was
//! never written (e.g. after a raw `cp`).

use crate::mbtiles::MbtilesReader;
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;
use utiles_core::TileFormat;

/// What [`update`] managed to re-derive; per the error model, a partial
/// result (format majority failed, say) is not fatal as long as
/// minzoom/maxzoom were written.
#[derive(Debug, Clone, Default)]
pub struct UpdateReport {
	pub format: Option<TileFormat>,
	pub minzoom: Option<u8>,
	pub maxzoom: Option<u8>,
	pub bounds: Option<(f64, f64, f64, f64)>,
	pub center: Option<(f64, f64, u8)>,
}

/// Recompute metadata for the MBTiles file at `path` and write it back.
pub fn update(path: &Path) -> Result<UpdateReport> {
	let reader = MbtilesReader::open(path)?;
	let tiles = reader.all_tiles()?;
	let mut report = UpdateReport::default();

	if tiles.is_empty() {
		return Ok(report);
	}

	let mut format_votes: HashMap<TileFormat, usize> = HashMap::new();
	let (mut west, mut south, mut east, mut north) = (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
	let (mut zmin, mut zmax) = (u8::MAX, 0u8);

	for (tile, data) in &tiles {
		*format_votes.entry(utiles_core::sniff(data).format).or_insert(0) += 1;
		let bounds = tile.bounds();
		west = west.min(bounds.west);
		south = south.min(bounds.south);
		east = east.max(bounds.east);
		north = north.max(bounds.north);
		zmin = zmin.min(tile.z);
		zmax = zmax.max(tile.z);
	}

	let format = format_votes.into_iter().max_by_key(|(_, count)| *count).map(|(f, _)| f);

	report.format = format;
	report.minzoom = Some(zmin);
	report.maxzoom = Some(zmax);
	report.bounds = Some((west, south, east, north));
	report.center = Some(((west + east) / 2.0, (south + north) / 2.0, zmin));

	let conn = reader.pool().get()?;
	let mut set = |name: &str, value: String| -> Result<()> {
		conn.execute("INSERT OR REPLACE INTO metadata (name, value) VALUES (?1, ?2)", [name, value.as_str()])?;
		Ok(())
	};
	if let Some(f) = format {
		set("format", f.extension().to_string())?;
	}
	set("minzoom", zmin.to_string())?;
	set("maxzoom", zmax.to_string())?;
	set("bounds", format!("{west},{south},{east},{north}"))?;
	if let Some((cx, cy, cz)) = report.center {
		set("center", format!("{cx},{cy},{cz}"))?;
	}

	Ok(report)
}
