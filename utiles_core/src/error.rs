//! Typed error kinds for the core tile algebra and storage operations.
//!
//! Every fallible operation in `utiles_core` (and the crates built on top of
//! it) returns `anyhow::Result`, but the underlying failure is always one of
//! these kinds so that a CLI front end can map it to an exit code without
//! string-matching. Each variant carries the offending value so its
//! `Display` impl is a usable single-line diagnostic.

use thiserror::Error;

/// The full error surface described by the specification's error model.
#[derive(Debug, Error)]
pub enum UtilesError {
	#[error("invalid tile ({x}, {y}, {z}): must satisfy 0 <= x,y < 2^z")]
	InvalidTile { x: u32, y: u32, z: u8 },

	#[error("invalid longitude: {0}")]
	InvalidLng(f64),

	#[error("invalid latitude: {0} (must be in (-90, 90))")]
	InvalidLat(f64),

	#[error("invalid zoom: {0}")]
	InvalidZoom(i64),

	#[error("invalid bbox ({west}, {south}, {east}, {north}): {reason}")]
	InvalidBbox {
		west: f64,
		south: f64,
		east: f64,
		north: f64,
		reason: String,
	},

	#[error("bad quadkey {quadkey:?}: {reason}")]
	BadQuadkey { quadkey: String, reason: String },

	#[error("not found: {0}")]
	NotFound(String),

	#[error("write conflict at {0}")]
	WriteConflict(String),

	#[error("io error at {path}: {source}")]
	IoError {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("database error: {0}")]
	DbError(String),

	#[error("decode error: {0}")]
	DecodeError(String),
}

impl UtilesError {
	/// Exit code a CLI should use for this error, per the spec's §7 mapping:
	/// bad user input (invalid JSON/tile/zoom) is 2, everything else is 1.
	#[must_use]
	pub fn exit_code(&self) -> i32 {
		match self {
			UtilesError::InvalidTile { .. }
			| UtilesError::InvalidLng(_)
			| UtilesError::InvalidLat(_)
			| UtilesError::InvalidZoom(_)
			| UtilesError::InvalidBbox { .. }
			| UtilesError::BadQuadkey { .. } => 2,
			_ => 1,
		}
	}
}
