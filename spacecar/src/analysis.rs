//! Run orchestration.
//!
//! One run goes through the whole chain:
//!
//! ```text
//! Polygon → search scenes → choose scene → release imagery + cars maps
//!         → dispatch tiles (concurrent) → write images, counts, summary
//! ```
//!
//! Any failure aborts the run before the writer is reached, so a summary on
//! disk always describes a complete run.

use crate::api::{ApiError, AsyncHttpClient, SceneQuery, SpaceKnowClient};
use crate::config::ConfigFile;
use crate::dispatch::{dispatch, DetectionResult, DispatchError, SceneTiles};
use crate::geometry::Polygon;
use crate::output::{OutputError, OutputWriter, Summary};
use crate::scene::choose_best_scene;
use chrono::{DateTime, Days, Local};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn, Level};

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Scene discovery or map release failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The search returned no scene for the area
    #[error("No scenes available for the area in the search window")]
    NoScenes,

    /// A tile detection failed
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Writing the results failed
    #[error(transparent)]
    Output(#[from] OutputError),

    /// The output task panicked
    #[error("Output task failed: {0}")]
    Task(String),
}

impl AnalysisError {
    /// True when the run failed because of the bearer credential.
    pub fn is_authentication(&self) -> bool {
        match self {
            AnalysisError::Api(e) => e.is_authentication(),
            AnalysisError::Dispatch(e) => e.api_error().is_some_and(ApiError::is_authentication),
            _ => false,
        }
    }
}

/// Run parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    pub provider: String,
    pub dataset: String,
    /// Search window in days before today
    pub days_ago: u32,
    pub max_cloud_cover: f64,
    /// Root directory for run output
    pub output_dir: PathBuf,
}

impl AnalysisOptions {
    pub fn from_config(config: &ConfigFile) -> Self {
        Self {
            provider: config.search.provider.clone(),
            dataset: config.search.dataset.clone(),
            days_ago: config.search.days_ago,
            max_cloud_cover: config.search.max_cloud_cover,
            output_dir: config.output.directory.clone(),
        }
    }

    fn query(&self, today: DateTime<Local>) -> SceneQuery {
        let today = today.date_naive();
        SceneQuery {
            provider: self.provider.clone(),
            dataset: self.dataset.clone(),
            since: today
                .checked_sub_days(Days::new(self.days_ago.into()))
                .unwrap_or(today),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: Summary,
    /// Directory the run was written to
    pub output_dir: PathBuf,
}

/// Car-counting run over one area of interest.
pub struct Analysis<C> {
    client: Arc<SpaceKnowClient<C>>,
    options: AnalysisOptions,
    writer: OutputWriter,
}

impl<C: AsyncHttpClient + 'static> Analysis<C> {
    pub fn new(client: SpaceKnowClient<C>, options: AnalysisOptions) -> Self {
        let writer = OutputWriter::new(options.output_dir.clone());
        Self {
            client: Arc::new(client),
            options,
            writer,
        }
    }

    pub fn client(&self) -> &SpaceKnowClient<C> {
        &self.client
    }

    /// Runs the analysis and writes its output.
    pub async fn run(&self, polygon: &Polygon) -> Result<RunReport, AnalysisError> {
        let started = Local::now();
        let extent = polygon.extent();

        if polygon.is_empty() {
            warn!("Polygon is empty, no tiles to analyze");
            let summary = Summary::new(started, None, &[], 0, extent.clone());
            return self.write(started, Vec::new(), summary).await;
        }

        let scenes = self
            .client
            .search_scenes(extent, &self.options.query(started))
            .await?;
        let scene = choose_best_scene(&scenes, self.options.max_cloud_cover)
            .ok_or(AnalysisError::NoScenes)?;
        info!(scene_id = %scene.scene_id, "Processing scene");

        let (imagery, cars) = self.client.release_maps(extent, &scene.scene_id).await?;
        if imagery.tiles != cars.tiles {
            debug!(
                imagery_tiles = imagery.tiles.len(),
                cars_tiles = cars.tiles.len(),
                "Imagery and cars maps list different tiles, using imagery tiles"
            );
        }
        if let Some(zoom) = imagery.tiles.first().map(|t| t.zoom) {
            if tracing::enabled!(Level::DEBUG) {
                if let Ok(bounding_box) = polygon.covering_tile_count(zoom) {
                    debug!(
                        zoom,
                        returned = imagery.tiles.len(),
                        bounding_box,
                        "Tile coverage"
                    );
                }
            }
        }

        let source = Arc::new(SceneTiles::new(
            Arc::clone(&self.client),
            imagery.map_id,
            cars.map_id,
        ));
        let outcome = dispatch(source, &imagery.tiles).await?;

        let summary = Summary::new(
            started,
            Some((scene.scene_id.as_str(), scene.datetime.as_str())),
            &outcome.results,
            outcome.total_cars,
            extent.clone(),
        );
        self.write(started, outcome.results, summary).await
    }

    async fn write(
        &self,
        started: DateTime<Local>,
        results: Vec<DetectionResult>,
        summary: Summary,
    ) -> Result<RunReport, AnalysisError> {
        let writer = self.writer.clone();
        tokio::task::spawn_blocking(move || {
            let output_dir = writer.write_run(started, &results, &summary)?;
            Ok::<_, AnalysisError>(RunReport {
                summary,
                output_dir,
            })
        })
        .await
        .map_err(|e| AnalysisError::Task(e.to_string()))?
    }
}
