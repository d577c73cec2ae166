//! Tile dispatcher - concurrent per-tile detection with fan-in.
//!
//! One Tokio task is spawned per tile on a `JoinSet`; there is no pool size
//! beyond what the runtime provides. Results are collected as they complete
//! and summed. The first failed tile aborts every outstanding task and fails
//! the whole dispatch; no partial result is ever returned.

use crate::api::{count_detections, ApiError, AsyncHttpClient, GridFile, SpaceKnowClient};
use crate::coord::TileCoord;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

/// Detection output for one tile.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    pub tile: TileCoord,
    /// Number of detected cars
    pub car_count: usize,
    /// Truecolor image (PNG)
    pub imagery: Vec<u8>,
    /// Transparent cars overlay (PNG)
    pub overlay: Vec<u8>,
}

/// Successful dispatch over a tile set.
#[derive(Debug, Clone, Default)]
pub struct DispatchOutcome {
    /// Per-tile results, ordered by tile
    pub results: Vec<DetectionResult>,
    /// Sum of all per-tile counts
    pub total_cars: usize,
}

/// Dispatch failure.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A tile's detection request failed
    #[error("Detection for tile {tile} failed: {source}")]
    Tile {
        tile: TileCoord,
        #[source]
        source: ApiError,
    },

    /// A tile task panicked or was cancelled
    #[error("Detection task failed: {0}")]
    Task(String),
}

impl DispatchError {
    /// The remote error behind a tile failure, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            DispatchError::Tile { source, .. } => Some(source),
            DispatchError::Task(_) => None,
        }
    }
}

/// Source of per-tile detection results.
pub trait TileSource: Send + Sync + 'static {
    /// Issues the detection request for one tile.
    fn detect(
        &self,
        tile: TileCoord,
    ) -> impl Future<Output = Result<DetectionResult, ApiError>> + Send;
}

/// Detects cars on every tile concurrently and sums the counts.
///
/// Duplicate tiles are requested once. An empty tile set issues no request
/// and yields a zero total.
#[instrument(skip(source, tiles), fields(tiles = tiles.len()))]
pub async fn dispatch<S: TileSource>(
    source: Arc<S>,
    tiles: &[TileCoord],
) -> Result<DispatchOutcome, DispatchError> {
    let unique: BTreeSet<TileCoord> = tiles.iter().copied().collect();
    if unique.is_empty() {
        debug!("No tiles to dispatch");
        return Ok(DispatchOutcome::default());
    }

    let mut detections = JoinSet::new();
    for tile in unique {
        let source = Arc::clone(&source);
        detections.spawn(async move { (tile, source.detect(tile).await) });
    }

    let mut results = Vec::with_capacity(detections.len());
    while let Some(joined) = detections.join_next().await {
        match joined {
            Ok((_, Ok(result))) => {
                debug!(tile = %result.tile, cars = result.car_count, "Tile detection complete");
                results.push(result);
            }
            Ok((tile, Err(source))) => {
                warn!(tile = %tile, error = %source, "Tile detection failed, aborting run");
                detections.abort_all();
                return Err(DispatchError::Tile { tile, source });
            }
            Err(join_err) => {
                warn!(error = %join_err, "Detection task failed, aborting run");
                detections.abort_all();
                return Err(DispatchError::Task(join_err.to_string()));
            }
        }
    }

    results.sort_by_key(|r| r.tile);
    let total_cars = results.iter().map(|r| r.car_count).sum();
    info!(tiles = results.len(), total_cars, "All tiles processed");

    Ok(DispatchOutcome {
        results,
        total_cars,
    })
}

/// Tiles of a released scene, served by the remote grid.
///
/// Per tile it downloads the truecolor image from the imagery map and the
/// overlay plus detections from the cars map.
pub struct SceneTiles<C> {
    client: Arc<SpaceKnowClient<C>>,
    imagery_map_id: String,
    cars_map_id: String,
}

impl<C> SceneTiles<C> {
    pub fn new(
        client: Arc<SpaceKnowClient<C>>,
        imagery_map_id: impl Into<String>,
        cars_map_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            imagery_map_id: imagery_map_id.into(),
            cars_map_id: cars_map_id.into(),
        }
    }
}

impl<C: AsyncHttpClient + 'static> TileSource for SceneTiles<C> {
    async fn detect(&self, tile: TileCoord) -> Result<DetectionResult, ApiError> {
        let (imagery, overlay, detections) = futures::try_join!(
            self.client
                .fetch_grid_file(&self.imagery_map_id, tile, GridFile::Truecolor),
            self.client
                .fetch_grid_file(&self.cars_map_id, tile, GridFile::CarsOverlay),
            self.client
                .fetch_grid_file(&self.cars_map_id, tile, GridFile::Detections),
        )?;

        Ok(DetectionResult {
            tile,
            car_count: count_detections(&detections)?,
            imagery,
            overlay,
        })
    }
}
