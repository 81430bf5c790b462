//! Parses the RS-prefixed (RFC 8142) or LF-delimited JSON value stream that
//! `tiles`, `bounding-tile`, `parent`, `children`, `neighbors`, `quadkey`,
//! `shapes`, `burn`, and `edges` all read from stdin.

use anyhow::Result;
use std::io::BufRead;
use utiles_core::UtilesError;

const RS: u8 = 0x1e;

/// One value read off stdin, already classified by its leading token.
#[derive(Debug, Clone)]
pub enum StdinValue {
	/// `[...]` — a tile triple or a bbox array.
    Array(serde_json::Value),
	/// `{...}` — a GeoJSON object.
	Object(serde_json::Value),
	/// Anything else — treated as a bare quadkey string.
	Quadkey(String),
}

/// Read every value off `input`, applying the RS-sequence-or-LF rule from
/// the CLI's stdin contract. An unterminated RS buffer at EOF is flushed.
pub fn read_values(input: impl BufRead) -> Result<Vec<StdinValue>> {
	let mut values = Vec::new();
	let mut rs_buffer: Option<String> = None;

	for line in input.lines() {
		let mut line = line?;
		if let Some(rest) = line.strip_prefix(RS as char) {
			if let Some(buf) = rs_buffer.take() {
				push_value(&mut values, &buf)?;
			}
			rs_buffer = Some(rest.to_string());
			continue;
		}
		if let Some(buf) = rs_buffer.as_mut() {
			buf.push('\n');
			buf.push_str(&line);
			continue;
		}
		line = line.trim().to_string();
		if line.is_empty() {
			continue;
		}
		push_value(&mut values, &line)?;
	}
	if let Some(buf) = rs_buffer {
		if !buf.trim().is_empty() {
			push_value(&mut values, &buf)?;
		}
	}
	Ok(values)
}

fn push_value(values: &mut Vec<StdinValue>, raw: &str) -> Result<()> {
	let trimmed = raw.trim();
	if trimmed.is_empty() {
		return Ok(());
	}
	match trimmed.as_bytes()[0] {
		b'[' => values.push(StdinValue::Array(serde_json::from_str(trimmed)?)),
		b'{' => values.push(StdinValue::Object(serde_json::from_str(trimmed)?)),
		_ => {
			let quadkey = trimmed.trim_matches('"').to_string();
			if quadkey.is_empty() {
				return Err(UtilesError::BadQuadkey {
					quadkey,
					reason: "empty token".to_string(),
				}
				.into());
			}
			values.push(StdinValue::Quadkey(quadkey));
		}
	}
	Ok(())
}

/// Writer side of the `--seq` contract: RS-prefix each emitted line when
/// sequence mode is on, otherwise emit plain LF-delimited JSON.
pub fn write_value(out: &mut impl std::io::Write, value: &serde_json::Value, seq: bool) -> Result<()> {
	if seq {
		out.write_all(&[RS])?;
	}
	serde_json::to_writer(&mut *out, value)?;
	out.write_all(b"\n")?;
	Ok(())
}
