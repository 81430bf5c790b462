//! Parsing of GeoJSON text into [`geo_types::Geometry`] values, flattening
//! `FeatureCollection` -> `Feature` -> `Geometry` -> `GeometryCollection`
//! into a single flat list the cover algorithms can iterate over.

use anyhow::{anyhow, Context, Result};
use geojson::GeoJson;

/// The geometries extracted from a GeoJSON document, in document order.
#[derive(Debug, Clone)]
pub struct ParsedGeometries {
	pub geometries: Vec<geo_types::Geometry<f64>>,
}

/// Parse a GeoJSON document (bare geometry, `Feature`, or
/// `FeatureCollection`) into a flat list of geometries.
pub fn parse(input: &str) -> Result<ParsedGeometries> {
	let doc: GeoJson = input.parse().context("parsing GeoJSON")?;
	let mut geometries = Vec::new();
	collect(&doc, &mut geometries)?;
	Ok(ParsedGeometries { geometries })
}

fn collect(doc: &GeoJson, out: &mut Vec<geo_types::Geometry<f64>>) -> Result<()> {
	match doc {
		GeoJson::Geometry(g) => {
			let converted: geo_types::Geometry<f64> = g
				.clone()
				.try_into()
				.map_err(|e| anyhow!("unsupported GeoJSON geometry: {e}"))?;
			flatten_into(converted, out);
		}
		GeoJson::Feature(f) => {
			if let Some(g) = &f.geometry {
				let converted: geo_types::Geometry<f64> = g
					.clone()
					.try_into()
					.map_err(|e| anyhow!("unsupported GeoJSON geometry: {e}"))?;
				flatten_into(converted, out);
			}
		}
		GeoJson::FeatureCollection(fc) => {
			for f in &fc.features {
				if let Some(g) = &f.geometry {
					let converted: geo_types::Geometry<f64> = g
						.clone()
						.try_into()
						.map_err(|e| anyhow!("unsupported GeoJSON geometry: {e}"))?;
					flatten_into(converted, out);
				}
			}
		}
	}
	Ok(())
}

/// `GeometryCollection` is unwrapped so downstream cover logic never has to
/// recurse; every other variant is pushed as-is.
fn flatten_into(geometry: geo_types::Geometry<f64>, out: &mut Vec<geo_types::Geometry<f64>>) {
	match geometry {
		geo_types::Geometry::GeometryCollection(gc) => {
			for g in gc {
				flatten_into(g, out);
			}
		}
		other => out.push(other),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_bare_point() {
		let parsed = parse(r#"{"type":"Point","coordinates":[1.0,2.0]}"#).unwrap();
		assert_eq!(parsed.geometries.len(), 1);
		assert!(matches!(parsed.geometries[0], geo_types::Geometry::Point(_)));
	}

	#[test]
	fn parses_feature_collection() {
		let input = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [0, 0]}},
                {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [1, 1]}}
            ]
        }"#;
		let parsed = parse(input).unwrap();
		assert_eq!(parsed.geometries.len(), 2);
	}

	#[test]
	fn flattens_geometry_collection() {
		let input = r#"{
            "type": "GeometryCollection",
            "geometries": [
                {"type": "Point", "coordinates": [0, 0]},
                {"type": "Point", "coordinates": [1, 1]}
            ]
        }"#;
		let parsed = parse(input).unwrap();
		assert_eq!(parsed.geometries.len(), 2);
	}
}
