//! Integration tests for a complete analysis run.
//!
//! These tests drive `Analysis::run` against an in-process fake of the
//! remote service and verify:
//! - One detection request per tile and the aggregated total
//! - Fail-fast behavior when a single tile fails
//! - Deterministic totals across runs
//! - Empty polygons short-circuiting without remote calls
//! - Authentication failures surfacing as such

use image::{ImageFormat, Rgba, RgbaImage};
use serde_json::{json, Value};
use spacecar::analysis::{Analysis, AnalysisError, AnalysisOptions};
use spacecar::api::{
    ApiEndpoints, ApiError, AsyncHttpClient, BearerToken, HttpResponse, SpaceKnowClient,
    INVALID_AUTHORIZATION,
};
use spacecar::config::ConfigFile;
use spacecar::geometry::Polygon;
use spacecar::output::SUMMARY_FILE;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

/// In-process fake of the analysis service.
struct FakeService {
    /// Car count per tile `x-y`; `None` makes the tile's detections fail
    detections: HashMap<String, Option<usize>>,
    tiles: Vec<[u32; 3]>,
    reject_token: bool,
    requests: Mutex<Vec<String>>,
}

impl FakeService {
    fn new(tiles: &[(u32, u32, Option<usize>)]) -> Self {
        Self {
            detections: tiles
                .iter()
                .map(|(x, y, count)| (format!("{}/{}", x, y), *count))
                .collect(),
            tiles: tiles.iter().map(|(x, y, _)| [19, *x, *y]).collect(),
            reject_token: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn rejecting_token(mut self) -> Self {
        self.reject_token = true;
        self
    }

    fn count(&self, pattern: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.contains(pattern))
            .count()
    }

    fn total_requests(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn respond(&self, url: &str) -> HttpResponse {
        self.requests.lock().unwrap().push(url.to_string());

        if self.reject_token {
            return HttpResponse::new(
                401,
                json!({"error": INVALID_AUTHORIZATION, "errorMessage": "Invalid token"})
                    .to_string(),
            );
        }

        if url.ends_with("/initiate") {
            return HttpResponse::json(&json!({"pipelineId": url, "nextTry": 0}));
        }
        if url.contains("get-status") {
            return HttpResponse::json(&json!({"status": "RESOLVED", "nextTry": 0}));
        }
        if url.contains("search/retrieve") {
            return HttpResponse::json(&json!({"results": [
                {"sceneId": "cloudy", "datetime": "2026-09-01 10:00:00",
                 "cloudCover": 0.9, "bands": [{"gsd": 0.3}]},
                {"sceneId": "clear", "datetime": "2026-09-10 10:00:00",
                 "cloudCover": 0.05, "bands": [{"gsd": 0.5}]}
            ]}));
        }
        if url.contains("imagery/geojson/retrieve") {
            return HttpResponse::json(&json!({"mapId": "img-map", "tiles": self.tiles}));
        }
        if url.contains("cars/geojson/retrieve") {
            return HttpResponse::json(&json!({"mapId": "car-map", "tiles": self.tiles}));
        }
        if url.ends_with("truecolor.png") {
            return HttpResponse::new(200, png(Rgba([0, 128, 0, 255])));
        }
        if url.ends_with("cars.png") {
            return HttpResponse::new(200, png(Rgba([255, 0, 0, 0])));
        }
        if url.ends_with("detections.geojson") {
            let key = tile_key(url);
            return match self.detections.get(&key).copied().flatten() {
                Some(count) => HttpResponse::json(&json!({
                    "type": "FeatureCollection",
                    "features": vec![json!({"type": "Feature"}); count]
                })),
                None => HttpResponse::new(
                    500,
                    json!({"error": "INTERNAL", "errorMessage": "tile failed"}).to_string(),
                ),
            };
        }
        HttpResponse::new(404, "not found")
    }
}

/// `x/y` part of `.../-/{z}/{x}/{y}/{file}`.
fn tile_key(url: &str) -> String {
    let parts: Vec<&str> = url.rsplit('/').take(3).collect();
    format!("{}/{}", parts[2], parts[1])
}

impl AsyncHttpClient for FakeService {
    async fn post_json(
        &self,
        url: &str,
        _bearer_token: &str,
        _body: &Value,
    ) -> Result<HttpResponse, ApiError> {
        Ok(self.respond(url))
    }

    async fn get(&self, url: &str, _bearer_token: &str) -> Result<HttpResponse, ApiError> {
        Ok(self.respond(url))
    }
}

fn png(color: Rgba<u8>) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbaImage::from_pixel(8, 8, color)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn polygon() -> Polygon {
    Polygon::from_geojson(json!({
        "type": "Feature",
        "properties": {},
        "geometry": {
            "type": "Polygon",
            "coordinates": [[
                [16.60, 49.20], [16.61, 49.20], [16.61, 49.19], [16.60, 49.20]
            ]]
        }
    }))
    .unwrap()
}

fn analysis(service: FakeService, output: &Path) -> Analysis<FakeService> {
    let client =
        SpaceKnowClient::new(service, BearerToken::new("token"), ApiEndpoints::default())
            .unwrap();
    let options = AnalysisOptions {
        output_dir: output.to_path_buf(),
        ..AnalysisOptions::from_config(&ConfigFile::default())
    };
    Analysis::new(client, options)
}

fn run_dirs(root: &Path) -> usize {
    std::fs::read_dir(root).map(|d| d.count()).unwrap_or(0)
}

// =============================================================================
// Integration Tests
// =============================================================================

#[tokio::test]
async fn test_full_run_counts_every_tile_once() {
    let temp = TempDir::new().unwrap();
    let analysis = analysis(
        FakeService::new(&[(10, 20, Some(2)), (11, 20, Some(5)), (10, 21, Some(0))]),
        temp.path(),
    );

    let report = analysis.run(&polygon()).await.unwrap();

    assert_eq!(report.summary.total_cars, 7);
    assert_eq!(report.summary.scene_id.as_deref(), Some("clear"));
    assert_eq!(report.summary.tiles.len(), 3);

    let service = analysis.client().http();
    assert_eq!(service.count("detections.geojson"), 3);
    assert_eq!(service.count("truecolor.png"), 3);
    assert_eq!(service.count("/img-map/"), 3);

    for stem in ["10-20", "11-20", "10-21"] {
        assert!(report.output_dir.join(format!("{}.png", stem)).exists());
        assert!(report.output_dir.join(format!("{}.json", stem)).exists());
    }
    let summary: Value = serde_json::from_str(
        &std::fs::read_to_string(report.output_dir.join(SUMMARY_FILE)).unwrap(),
    )
    .unwrap();
    assert_eq!(summary["total_cars"], 7);
    assert_eq!(summary["scene_datetime"], "2026-09-10 10:00:00");
}

#[tokio::test]
async fn test_single_tile_failure_fails_run_without_summary() {
    let temp = TempDir::new().unwrap();
    let analysis = analysis(
        FakeService::new(&[(10, 20, Some(2)), (11, 20, None), (12, 20, Some(1))]),
        temp.path(),
    );

    let err = analysis.run(&polygon()).await.unwrap_err();

    assert!(matches!(err, AnalysisError::Dispatch(_)), "{}", err);
    assert!(!err.is_authentication());
    assert_eq!(run_dirs(temp.path()), 0, "no output may be written");
}

#[tokio::test]
async fn test_repeated_runs_produce_same_total() {
    let tiles = [
        (1, 1, Some(4)),
        (2, 1, Some(9)),
        (3, 1, Some(1)),
        (1, 2, Some(0)),
        (2, 2, Some(6)),
    ];

    let first_dir = TempDir::new().unwrap();
    let first = analysis(FakeService::new(&tiles), first_dir.path())
        .run(&polygon())
        .await
        .unwrap();
    let second_dir = TempDir::new().unwrap();
    let second = analysis(FakeService::new(&tiles), second_dir.path())
        .run(&polygon())
        .await
        .unwrap();

    assert_eq!(first.summary.total_cars, 20);
    assert_eq!(first.summary.total_cars, second.summary.total_cars);
    assert_eq!(first.summary.tiles, second.summary.tiles);
}

#[tokio::test]
async fn test_empty_polygon_makes_no_requests() {
    let temp = TempDir::new().unwrap();
    let analysis = analysis(FakeService::new(&[(1, 1, Some(3))]), temp.path());
    let empty = Polygon::from_geojson(json!({"type": "FeatureCollection", "features": []}))
        .unwrap();

    let report = analysis.run(&empty).await.unwrap();

    assert_eq!(report.summary.total_cars, 0);
    assert!(report.summary.tiles.is_empty());
    assert_eq!(analysis.client().http().total_requests(), 0);
    assert!(report.output_dir.join(SUMMARY_FILE).exists());
}

#[tokio::test]
async fn test_no_tiles_returned_yields_zero_total() {
    let temp = TempDir::new().unwrap();
    let analysis = analysis(FakeService::new(&[]), temp.path());

    let report = analysis.run(&polygon()).await.unwrap();

    assert_eq!(report.summary.total_cars, 0);
    assert_eq!(analysis.client().http().count("detections.geojson"), 0);
}

#[tokio::test]
async fn test_invalid_token_is_authentication_error() {
    let temp = TempDir::new().unwrap();
    let analysis = analysis(
        FakeService::new(&[(1, 1, Some(3))]).rejecting_token(),
        temp.path(),
    );

    let err = analysis.run(&polygon()).await.unwrap_err();

    assert!(err.is_authentication(), "{}", err);
    assert_eq!(analysis.client().http().total_requests(), 1);
    assert_eq!(run_dirs(temp.path()), 0);
}
