//! SpaceKnow API client.

use super::error::{ApiError, INVALID_AUTHORIZATION};
use super::http::{AsyncHttpClient, HttpResponse};
use super::types::{GridFile, MapKind, Scene, SceneMap, SceneQuery, SearchResults};
use super::{ApiEndpoints, BearerToken};
use crate::coord::TileCoord;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

/// Error body returned by the service on non-success statuses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

/// Client for scene search, map release and grid downloads.
///
/// Generic over the HTTP client so tests can inject a mock.
pub struct SpaceKnowClient<C> {
    http: C,
    token: BearerToken,
    endpoints: ApiEndpoints,
}

impl<C: AsyncHttpClient> SpaceKnowClient<C> {
    /// Creates a client.
    ///
    /// Fails with `ApiError::Authentication` when the token is empty, before
    /// any request is made.
    pub fn new(http: C, token: BearerToken, endpoints: ApiEndpoints) -> Result<Self, ApiError> {
        if token.is_empty() {
            return Err(ApiError::Authentication(format!(
                "No bearer token provided (set {} or pass --token)",
                super::TOKEN_ENV_VAR
            )));
        }
        Ok(Self {
            http,
            token,
            endpoints,
        })
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    pub fn http(&self) -> &C {
        &self.http
    }

    /// Searches scenes acquired since `query.since` over the extent.
    #[instrument(skip(self, extent), fields(dataset = %query.dataset))]
    pub async fn search_scenes(
        &self,
        extent: &Value,
        query: &SceneQuery,
    ) -> Result<Vec<Scene>, ApiError> {
        let retrieved = self
            .run_pipeline(&self.endpoints.search_url, query.payload(extent))
            .await?;
        let results: SearchResults =
            serde_json::from_value(retrieved).map_err(|e| ApiError::malformed("search", e))?;
        info!(scenes = results.results.len(), "Scenes from search were obtained");
        Ok(results.results)
    }

    /// Triggers analysis of one layer for a scene and returns the released map.
    #[instrument(skip(self, kind, extent), fields(kind = kind.name()))]
    pub async fn release_map(
        &self,
        kind: MapKind,
        extent: &Value,
        scene_id: &str,
    ) -> Result<SceneMap, ApiError> {
        let endpoint = match kind {
            MapKind::Imagery => &self.endpoints.imagery_url,
            MapKind::Cars => &self.endpoints.cars_url,
        };
        let payload = json!({ "sceneId": scene_id, "extent": extent });
        let retrieved = self.run_pipeline(endpoint, payload).await?;
        let map: SceneMap =
            serde_json::from_value(retrieved).map_err(|e| ApiError::malformed("release", e))?;
        debug!(map_id = %map.map_id, tiles = map.tiles.len(), "Map released");
        Ok(map)
    }

    /// Releases the imagery and cars maps for a scene concurrently.
    pub async fn release_maps(
        &self,
        extent: &Value,
        scene_id: &str,
    ) -> Result<(SceneMap, SceneMap), ApiError> {
        let maps = futures::try_join!(
            self.release_map(MapKind::Imagery, extent, scene_id),
            self.release_map(MapKind::Cars, extent, scene_id),
        )?;
        info!("Maps for imagery and cars were obtained");
        Ok(maps)
    }

    /// Downloads one file of a grid tile.
    pub async fn fetch_grid_file(
        &self,
        map_id: &str,
        tile: TileCoord,
        file: GridFile,
    ) -> Result<Vec<u8>, ApiError> {
        let url = format!(
            "{}/{}/-/{}/{}/{}/{}",
            self.endpoints.grid_url,
            map_id,
            tile.zoom,
            tile.col,
            tile.row,
            file.file_name()
        );
        let response = self.http.get(&url, self.token.expose()).await?;
        check_response(&url, response)
    }

    /// POSTs a JSON payload and decodes the JSON answer.
    pub(crate) async fn post(&self, url: &str, payload: &Value) -> Result<Value, ApiError> {
        let response = self
            .http
            .post_json(url, self.token.expose(), payload)
            .await?;
        let body = check_response(url, response)?;
        let value = serde_json::from_slice(&body)
            .map_err(|e| ApiError::Service(format!("Invalid JSON from {}: {}", url, e)))?;
        debug!(url = url, "Request was successful");
        Ok(value)
    }
}

/// Maps a non-success response onto the matching error kind.
fn check_response(url: &str, response: HttpResponse) -> Result<Vec<u8>, ApiError> {
    if response.is_success() {
        return Ok(response.body);
    }

    let body: ErrorBody = serde_json::from_slice(&response.body).unwrap_or_default();
    let code = body.error.unwrap_or_default();

    if code == INVALID_AUTHORIZATION || response.status == 401 {
        return Err(ApiError::Authentication("Invalid token used".to_string()));
    }

    Err(ApiError::Service(format!(
        "HTTP {} from {}: {} {}",
        response.status,
        url,
        if code.is_empty() { "unknown error" } else { code.as_str() },
        body.error_message.unwrap_or_default()
    )
    .trim_end()
    .to_string()))
}
