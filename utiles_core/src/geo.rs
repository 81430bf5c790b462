//! Geographic primitives: longitude/latitude points and bounding boxes, plus
//! the spherical-Mercator projection used to go between them and tile space.

use crate::error::UtilesError;
use anyhow::{ensure, Result};
use std::f64::consts::PI;

/// Mean radius of the Web-Mercator sphere, in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;
const LL_EPSILON: f64 = 1e-11;
const MAX_LAT: f64 = 85.051_128_779_806_59;

/// A point in WGS84 longitude/latitude degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLat {
	pub lng: f64,
	pub lat: f64,
}

impl LngLat {
	#[must_use]
	pub fn new(lng: f64, lat: f64) -> Self {
		Self { lng, lat }
	}

	/// Clamp (not wrap) into valid WGS84 range.
	#[must_use]
	pub fn truncated(&self) -> Self {
		Self {
			lng: self.lng.clamp(-180.0, 180.0),
			lat: self.lat.clamp(-90.0, 90.0),
		}
	}

	/// Fractional Web-Mercator coordinates in `[0, 1]` x `[0, 1]`, with
	/// `(0, 0)` at the northwest corner of the world.
	pub fn mercator_fraction(&self) -> Result<(f64, f64)> {
		ensure!(
			self.lat > -90.0 && self.lat < 90.0,
			UtilesError::InvalidLat(self.lat)
		);
		let x = self.lng / 360.0 + 0.5;
		let sinlat = (self.lat * PI / 180.0).sin();
		let y = 0.5 - 0.25 * ((1.0 + sinlat) / (1.0 - sinlat)).ln() / PI;
		Ok((x, y))
	}
}

/// A bounding box in spherical-Mercator meters (EPSG:3857).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bbox {
	pub left: f64,
	pub bottom: f64,
	pub right: f64,
	pub top: f64,
}

impl Bbox {
	#[must_use]
	pub fn as_array(&self) -> [f64; 4] {
		[self.left, self.bottom, self.right, self.top]
	}
}

/// A bounding box in WGS84 longitude/latitude degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLatBbox {
	pub west: f64,
	pub south: f64,
	pub east: f64,
	pub north: f64,
}

impl LngLatBbox {
	#[must_use]
	pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
		Self {
			west,
			south,
			east,
			north,
		}
	}

	#[must_use]
	pub fn as_array(&self) -> [f64; 4] {
		[self.west, self.south, self.east, self.north]
	}

	/// Clamp to the valid lng/lat domain without wrapping, same semantics
	/// as [`LngLat::truncated`].
	#[must_use]
	pub fn truncated(&self) -> Self {
		let nw = LngLat::new(self.west, self.north).truncated();
		let se = LngLat::new(self.east, self.south).truncated();
		Self {
			west: nw.lng,
			north: nw.lat,
			east: se.lng,
			south: se.lat,
		}
	}

	/// Clip latitude to the Web-Mercator valid range and longitude to
	/// `[-180, 180]`; used before walking tile grids so polar clipping
	/// doesn't produce out-of-range tile indices.
	#[must_use]
	pub fn web_mercator_clip(&self) -> Self {
		Self {
			west: self.west.max(-180.0),
			south: self.south.max(-MAX_LAT),
			east: self.east.min(180.0),
			north: self.north.min(MAX_LAT),
		}
	}

	/// Split a bbox that crosses the antimeridian (`west > east`) into one
	/// or two non-crossing boxes.
	#[must_use]
	pub fn split_antimeridian(&self) -> Vec<Self> {
		if self.west > self.east {
			vec![
				Self::new(-180.0, self.south, self.east, self.north),
				Self::new(self.west, self.south, 180.0, self.north),
			]
		} else {
			vec![*self]
		}
	}

	/// The bbox shrunk by [`LL_EPSILON`] on all sides, used by [`crate::tile::tiles`]
	/// so that a tile edge lying exactly on the query boundary isn't
	/// spuriously included.
	#[must_use]
	pub fn eroded(&self) -> Self {
		Self {
			west: self.west + LL_EPSILON,
			south: self.south + LL_EPSILON,
			east: self.east - LL_EPSILON,
			north: self.north - LL_EPSILON,
		}
	}
}

/// Forward spherical-Mercator projection of a single point, in meters.
#[must_use]
pub fn lnglat_to_meters(lng: f64, lat: f64) -> (f64, f64) {
	let x = EARTH_RADIUS * lng.to_radians();
	let y = EARTH_RADIUS * ((PI / 4.0 + lat.to_radians() / 2.0).tan()).ln();
	(x, y)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn truncate_clamps_not_wraps() {
		let p = LngLat::new(200.0, -95.0).truncated();
		assert_eq!(p, LngLat::new(180.0, -90.0));
	}

	#[test]
	fn antimeridian_split_only_when_crossing() {
		let b = LngLatBbox::new(170.0, -10.0, -170.0, 10.0);
		let parts = b.split_antimeridian();
		assert_eq!(parts.len(), 2);
		assert_eq!(parts[0].west, -180.0);
		assert_eq!(parts[1].east, 180.0);

		let b2 = LngLatBbox::new(-10.0, -10.0, 10.0, 10.0);
		assert_eq!(b2.split_antimeridian().len(), 1);
	}
}
