//! Area-of-interest geometry.
//!
//! Loads the polygon to analyze from a GeoJSON file. The parsed document is
//! kept verbatim because the analysis service takes it as the request
//! `extent`; the extracted vertices are only used locally for bounds and
//! tile coverage.

mod polygon;

pub use polygon::{BoundingBox, LatLon, Polygon};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading an area of interest.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// The GeoJSON file could not be read
    #[error("Failed to read GeoJSON file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON
    #[error("Invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document has no usable polygon geometry
    #[error("Unsupported geometry type '{0}' (expected Polygon or MultiPolygon)")]
    UnsupportedGeometry(String),

    /// A position or ring is malformed
    #[error("Malformed GeoJSON: {0}")]
    Malformed(String),
}
