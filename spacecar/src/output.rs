//! Output writer - persists one run into a timestamped directory.
//!
//! Layout of a run directory:
//!
//! ```text
//! {root}/{YYYY-MM-DD_HH-MM-SS}/
//!     {x}-{y}.png      truecolor image with the cars overlay composited
//!     {x}-{y}.json     {"cars_count": n}
//!     summary.json     aggregate summary
//! ```
//!
//! Writing is blocking work; async callers should run it on the blocking
//! pool.

use crate::dispatch::DetectionResult;
use chrono::{DateTime, Local};
use image::ImageFormat;
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Name of the aggregate summary file.
pub const SUMMARY_FILE: &str = "summary.json";

/// Timestamp format of run directory names.
pub const RUN_DIR_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Output errors.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Filesystem operation failed
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A tile image could not be decoded, composited or encoded
    #[error("Image error for tile {tile}: {source}")]
    Image {
        tile: String,
        #[source]
        source: image::ImageError,
    },

    /// Serialization failed
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Car count of one tile as recorded in the summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileCount {
    /// File stem of the tile artifacts (`x-y`)
    pub tile: String,
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
    pub cars_count: usize,
}

/// Aggregate summary of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Run start, RFC 3339
    pub timestamp: String,
    pub scene_id: Option<String>,
    pub scene_datetime: Option<String>,
    pub total_cars: usize,
    pub tiles: Vec<TileCount>,
    /// Source polygon as GeoJSON
    pub polygon: Value,
}

impl Summary {
    pub fn new(
        started: DateTime<Local>,
        scene: Option<(&str, &str)>,
        results: &[DetectionResult],
        total_cars: usize,
        polygon: Value,
    ) -> Self {
        Self {
            timestamp: started.to_rfc3339(),
            scene_id: scene.map(|(id, _)| id.to_string()),
            scene_datetime: scene.map(|(_, dt)| dt.to_string()),
            total_cars,
            tiles: results
                .iter()
                .map(|r| TileCount {
                    tile: r.tile.file_stem(),
                    zoom: r.tile.zoom,
                    x: r.tile.col,
                    y: r.tile.row,
                    cars_count: r.car_count,
                })
                .collect(),
            polygon,
        }
    }
}

/// Writes run artifacts below a root directory.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Preferred directory for a run started at `started`.
    pub fn run_dir(&self, started: DateTime<Local>) -> PathBuf {
        self.root.join(started.format(RUN_DIR_FORMAT).to_string())
    }

    /// Creates a fresh run directory.
    ///
    /// Runs starting within the same second get `_1`, `_2`, ... suffixes;
    /// an existing directory is never reused.
    fn create_run_dir(&self, started: DateTime<Local>) -> Result<PathBuf, OutputError> {
        fs::create_dir_all(&self.root).map_err(|source| OutputError::Io {
            path: self.root.clone(),
            source,
        })?;

        let base = self.run_dir(started);
        let mut dir = base.clone();
        let mut suffix = 0u32;
        loop {
            match fs::create_dir(&dir) {
                Ok(()) => return Ok(dir),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    suffix += 1;
                    let mut name = base.as_os_str().to_owned();
                    name.push(format!("_{}", suffix));
                    dir = PathBuf::from(name);
                }
                Err(source) => return Err(OutputError::Io { path: dir, source }),
            }
        }
    }

    /// Writes every tile and then the summary; returns the run directory.
    ///
    /// The summary is written last so its presence means every tile file
    /// was written.
    pub fn write_run(
        &self,
        started: DateTime<Local>,
        results: &[DetectionResult],
        summary: &Summary,
    ) -> Result<PathBuf, OutputError> {
        let dir = self.create_run_dir(started)?;

        for result in results {
            write_tile(&dir, result)?;
        }
        write_summary(&dir, summary)?;

        info!(
            path = %dir.display(),
            tiles = results.len(),
            total_cars = summary.total_cars,
            "Images successfully saved"
        );
        Ok(dir)
    }
}

/// Composites the overlay onto the imagery and writes the image and count.
pub fn write_tile(dir: &Path, result: &DetectionResult) -> Result<(), OutputError> {
    let stem = result.tile.file_stem();
    let image_err = |source: image::ImageError| OutputError::Image {
        tile: stem.clone(),
        source,
    };

    let mut background = image::load_from_memory(&result.imagery)
        .map_err(image_err)?
        .to_rgba8();
    let foreground = image::load_from_memory(&result.overlay)
        .map_err(image_err)?
        .to_rgba8();
    image::imageops::overlay(&mut background, &foreground, 0, 0);

    let image_path = dir.join(format!("{}.png", stem));
    background
        .save_with_format(&image_path, ImageFormat::Png)
        .map_err(image_err)?;

    let count_path = dir.join(format!("{}.json", stem));
    write_json(&count_path, &json!({ "cars_count": result.car_count }))?;

    debug!(tile = %stem, cars = result.car_count, "Tile written");
    Ok(())
}

/// Writes `summary.json` into `dir`.
pub fn write_summary(dir: &Path, summary: &Summary) -> Result<(), OutputError> {
    write_json(&dir.join(SUMMARY_FILE), summary)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), OutputError> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}
