//! Gzip/deflate helpers for the MBTiles and directory writers, which may
//! store PBF tiles compressed regardless of what encoding the source data
//! arrived in.

use anyhow::{Context, Result};
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Gzip-compress `data` at the default compression level.
pub fn gzip_compress(data: &[u8]) -> Result<Vec<u8>> {
	let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
	encoder.write_all(data).context("writing to gzip encoder")?;
	encoder.finish().context("finishing gzip stream")
}

/// Decompress a gzip-wrapped payload.
pub fn gzip_decompress(data: &[u8]) -> Result<Vec<u8>> {
	let mut decoder = GzDecoder::new(data);
	let mut out = Vec::new();
	decoder.read_to_end(&mut out).context("decoding gzip stream")?;
	Ok(out)
}

/// Decompress a zlib/deflate-wrapped payload.
pub fn deflate_decompress(data: &[u8]) -> Result<Vec<u8>> {
	let mut decoder = ZlibDecoder::new(data);
	let mut out = Vec::new();
	decoder.read_to_end(&mut out).context("decoding deflate stream")?;
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn gzip_roundtrip() {
		let data = b"some pbf tile bytes, not really";
		let compressed = gzip_compress(data).unwrap();
		assert_ne!(compressed, data);
		let back = gzip_decompress(&compressed).unwrap();
		assert_eq!(back, data);
	}
}
