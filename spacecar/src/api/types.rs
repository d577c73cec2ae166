//! Wire types of the analysis service.

use super::error::ApiError;
use crate::coord::TileCoord;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

/// One spectral band of a scene.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Band {
    /// Ground sample distance in metres
    pub gsd: f64,
    #[serde(default)]
    pub names: Vec<String>,
}

/// A candidate acquisition returned by scene search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub scene_id: String,
    /// Acquisition time as reported by the service (`YYYY-MM-DD HH:MM:SS`)
    pub datetime: String,
    #[serde(default)]
    pub cloud_cover: Option<f64>,
    #[serde(default)]
    pub bands: Vec<Band>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub dataset: Option<String>,
}

impl Scene {
    /// Ground sample distance of the first band, if any.
    pub fn gsd(&self) -> Option<f64> {
        self.bands.first().map(|b| b.gsd)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResults {
    pub results: Vec<Scene>,
}

/// Parameters of a scene search.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneQuery {
    pub provider: String,
    pub dataset: String,
    /// Oldest acquisition date to consider
    pub since: NaiveDate,
}

impl SceneQuery {
    pub(crate) fn payload(&self, extent: &Value) -> Value {
        json!({
            "provider": self.provider,
            "dataset": self.dataset,
            "startDatetime": self.since.format("%Y-%m-%d 00:00:00").to_string(),
            "extent": extent,
        })
    }
}

/// Analysis layer released for a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapKind {
    /// Truecolor imagery
    Imagery,
    /// Car detections
    Cars,
}

impl MapKind {
    pub fn name(&self) -> &'static str {
        match self {
            MapKind::Imagery => "imagery",
            MapKind::Cars => "cars",
        }
    }
}

/// A released map: grid identifier plus the tiles covering the extent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneMap {
    pub map_id: String,
    #[serde(default)]
    pub tiles: Vec<TileCoord>,
}

/// Files served for each grid tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridFile {
    /// Truecolor imagery (imagery map)
    Truecolor,
    /// Transparent car overlay (cars map)
    CarsOverlay,
    /// Detected cars as a GeoJSON feature collection (cars map)
    Detections,
}

impl GridFile {
    pub fn file_name(&self) -> &'static str {
        match self {
            GridFile::Truecolor => "truecolor.png",
            GridFile::CarsOverlay => "cars.png",
            GridFile::Detections => "detections.geojson",
        }
    }
}

/// Number of detected objects in a `detections.geojson` payload.
pub fn count_detections(body: &[u8]) -> Result<usize, ApiError> {
    let doc: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::malformed("detections", e))?;
    doc.get("features")
        .and_then(Value::as_array)
        .map(Vec::len)
        .ok_or_else(|| ApiError::malformed("detections", "missing 'features' array"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_deserialize() {
        let scene: Scene = serde_json::from_value(json!({
            "sceneId": "abc",
            "datetime": "2026-08-01 10:12:13",
            "cloudCover": 0.1,
            "bands": [{"names": ["red"], "gsd": 0.5}],
            "provider": "gbdx",
            "extra": true
        }))
        .unwrap();
        assert_eq!(scene.scene_id, "abc");
        assert_eq!(scene.cloud_cover, Some(0.1));
        assert_eq!(scene.gsd(), Some(0.5));
    }

    #[test]
    fn test_scene_map_tiles_are_zoom_x_y() {
        let map: SceneMap = serde_json::from_value(json!({
            "mapId": "m-1",
            "maxZoom": 19,
            "tiles": [[19, 286023, 178702], [19, 286024, 178702]]
        }))
        .unwrap();
        assert_eq!(map.tiles.len(), 2);
        assert_eq!(map.tiles[1], TileCoord::new(19, 286024, 178702));
    }

    #[test]
    fn test_search_payload() {
        let query = SceneQuery {
            provider: "gbdx".to_string(),
            dataset: "idaho-pansharpened".to_string(),
            since: NaiveDate::from_ymd_opt(2026, 7, 20).unwrap(),
        };
        let payload = query.payload(&json!({"type": "FeatureCollection", "features": []}));
        assert_eq!(payload["startDatetime"], "2026-07-20 00:00:00");
        assert_eq!(payload["dataset"], "idaho-pansharpened");
        assert_eq!(payload["extent"]["type"], "FeatureCollection");
    }

    #[test]
    fn test_count_detections() {
        let body = json!({
            "type": "FeatureCollection",
            "features": [{"type": "Feature"}, {"type": "Feature"}, {"type": "Feature"}]
        })
        .to_string();
        assert_eq!(count_detections(body.as_bytes()).unwrap(), 3);
    }

    #[test]
    fn test_count_detections_malformed() {
        assert!(matches!(
            count_detections(b"not json"),
            Err(ApiError::Service(_))
        ));
        assert!(matches!(
            count_detections(b"{\"type\": \"FeatureCollection\"}"),
            Err(ApiError::Service(_))
        ));
    }
}
