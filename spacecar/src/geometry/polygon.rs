//! Polygon extraction, bounds and tile coverage.

use super::GeometryError;
use crate::coord::{to_tile_coords, CoordError, TileCoord, MAX_LAT, MIN_LAT};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// A single polygon vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// Geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// Area of interest loaded from GeoJSON.
///
/// Holds the exterior-ring vertices of every polygon in the document, in
/// document order, together with the original document.
#[derive(Debug, Clone)]
pub struct Polygon {
    vertices: Vec<LatLon>,
    extent: Value,
}

impl Polygon {
    /// Read and parse a GeoJSON file.
    pub async fn load(path: &Path) -> Result<Self, GeometryError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| GeometryError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let polygon = Self::from_geojson(serde_json::from_str(&text)?)?;
        debug!(
            path = %path.display(),
            vertices = polygon.vertices.len(),
            "Loaded area of interest"
        );
        Ok(polygon)
    }

    /// Build a polygon from a parsed GeoJSON object.
    ///
    /// Accepts a `FeatureCollection`, `Feature`, `GeometryCollection`,
    /// `Polygon` or `MultiPolygon`. Collections without features yield an
    /// empty polygon.
    pub fn from_geojson(extent: Value) -> Result<Self, GeometryError> {
        let mut vertices = Vec::new();
        collect_vertices(&extent, &mut vertices)?;
        Ok(Self { vertices, extent })
    }

    pub fn vertices(&self) -> &[LatLon] {
        &self.vertices
    }

    /// The original GeoJSON document, sent as the request extent.
    pub fn extent(&self) -> &Value {
        &self.extent
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        let first = self.vertices.first()?;
        let init = BoundingBox {
            north: first.lat,
            south: first.lat,
            east: first.lon,
            west: first.lon,
        };
        Some(self.vertices.iter().fold(init, |b, v| BoundingBox {
            north: b.north.max(v.lat),
            south: b.south.min(v.lat),
            east: b.east.max(v.lon),
            west: b.west.min(v.lon),
        }))
    }

    /// Tiles at `zoom` covering the polygon's bounding box, row-major.
    ///
    /// Latitudes beyond the Web Mercator limits are clamped. An empty polygon
    /// covers no tiles.
    pub fn covering_tiles(&self, zoom: u8) -> Result<Vec<TileCoord>, CoordError> {
        let Some((north_west, south_east)) = self.corner_tiles(zoom)? else {
            return Ok(Vec::new());
        };

        let tiles = (north_west.row..=south_east.row)
            .flat_map(|row| {
                (north_west.col..=south_east.col).map(move |col| TileCoord { row, col, zoom })
            })
            .collect();
        Ok(tiles)
    }

    /// Number of tiles `covering_tiles` would return, without building them.
    pub fn covering_tile_count(&self, zoom: u8) -> Result<u64, CoordError> {
        Ok(match self.corner_tiles(zoom)? {
            Some((north_west, south_east)) => {
                let rows = u64::from(south_east.row - north_west.row) + 1;
                let cols = u64::from(south_east.col - north_west.col) + 1;
                rows * cols
            }
            None => 0,
        })
    }

    /// North-west and south-east tiles of the bounding box.
    fn corner_tiles(&self, zoom: u8) -> Result<Option<(TileCoord, TileCoord)>, CoordError> {
        let Some(bounds) = self.bounds() else {
            return Ok(None);
        };
        let north_west = to_tile_coords(clamp_lat(bounds.north), bounds.west, zoom)?;
        let south_east = to_tile_coords(clamp_lat(bounds.south), bounds.east, zoom)?;
        Ok(Some((north_west, south_east)))
    }
}

fn clamp_lat(lat: f64) -> f64 {
    lat.clamp(MIN_LAT, MAX_LAT)
}

fn collect_vertices(value: &Value, out: &mut Vec<LatLon>) -> Result<(), GeometryError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GeometryError::Malformed("missing 'type' member".to_string()))?;

    match kind {
        "FeatureCollection" => {
            let features = member_array(value, "features")?;
            for feature in features {
                collect_vertices(feature, out)?;
            }
        }
        "Feature" => match value.get("geometry") {
            None | Some(Value::Null) => {}
            Some(geometry) => collect_vertices(geometry, out)?,
        },
        "GeometryCollection" => {
            for geometry in member_array(value, "geometries")? {
                collect_vertices(geometry, out)?;
            }
        }
        "Polygon" => {
            let rings = member_array(value, "coordinates")?;
            push_exterior_ring(rings, out)?;
        }
        "MultiPolygon" => {
            for polygon in member_array(value, "coordinates")? {
                let rings = polygon
                    .as_array()
                    .ok_or_else(|| GeometryError::Malformed("polygon is not an array".into()))?;
                push_exterior_ring(rings, out)?;
            }
        }
        other => return Err(GeometryError::UnsupportedGeometry(other.to_string())),
    }
    Ok(())
}

fn member_array<'a>(value: &'a Value, key: &str) -> Result<&'a Vec<Value>, GeometryError> {
    value
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| GeometryError::Malformed(format!("'{}' must be an array", key)))
}

fn push_exterior_ring(rings: &[Value], out: &mut Vec<LatLon>) -> Result<(), GeometryError> {
    // Holes do not change the bounding box; only the exterior ring matters.
    let Some(ring) = rings.first() else {
        return Ok(());
    };
    let positions = ring
        .as_array()
        .ok_or_else(|| GeometryError::Malformed("ring is not an array".to_string()))?;

    let mut ring_vertices = positions
        .iter()
        .map(parse_position)
        .collect::<Result<Vec<_>, _>>()?;

    // GeoJSON rings repeat the first position at the end.
    if ring_vertices.len() > 1 && ring_vertices.first() == ring_vertices.last() {
        ring_vertices.pop();
    }
    out.extend(ring_vertices);
    Ok(())
}

fn parse_position(position: &Value) -> Result<LatLon, GeometryError> {
    let malformed = || GeometryError::Malformed(format!("invalid position {}", position));
    let coords = position.as_array().ok_or_else(malformed)?;
    let lon = coords.first().and_then(Value::as_f64).ok_or_else(malformed)?;
    let lat = coords.get(1).and_then(Value::as_f64).ok_or_else(malformed)?;
    Ok(LatLon { lat, lon })
}
