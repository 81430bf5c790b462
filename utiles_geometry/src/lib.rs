//! Geometry-to-tile-set rasterization: GeoJSON ingestion, polygon/line
//! cover, edge extraction, and tile-boundary GeoJSON emission.
//!
//! Built on [`utiles_core::Tile`]; has no knowledge of storage.

pub mod cover;
pub mod edges;
pub mod geojson_ingest;
pub mod shapes;

pub use cover::{cover, cover_all, cover_range};
pub use edges::edges;
pub use geojson_ingest::{parse as parse_geojson, ParsedGeometries};
pub use shapes::{bbox_array, shape, shapes_collection, ShapeOptions};
