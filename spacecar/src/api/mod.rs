//! Client for the remote satellite analysis service.
//!
//! The service exposes long-running analyses as pipelines (see
//! [`pipeline`]) plus a static grid of per-tile files. All calls carry a
//! bearer token.
//!
//! ```ignore
//! use spacecar::api::{ApiEndpoints, BearerToken, ReqwestClient, SpaceKnowClient};
//!
//! let http = ReqwestClient::with_timeout(60)?;
//! let client = SpaceKnowClient::new(http, BearerToken::new(token), ApiEndpoints::default())?;
//! let scenes = client.search_scenes(polygon.extent(), &query).await?;
//! ```

mod client;
mod error;
mod http;
pub mod pipeline;
mod types;

pub use client::SpaceKnowClient;
pub use error::{ApiError, INVALID_AUTHORIZATION};
pub use http::{AsyncHttpClient, HttpResponse, ReqwestClient};
pub use types::{count_detections, Band, GridFile, MapKind, Scene, SceneMap, SceneQuery};

#[cfg(test)]
pub use http::tests::{MockAsyncHttpClient, RecordedRequest};

use crate::config::{
    DEFAULT_CARS_URL, DEFAULT_GRID_URL, DEFAULT_IMAGERY_URL, DEFAULT_SEARCH_URL,
    DEFAULT_TASKING_URL,
};
use std::fmt;

/// Environment variable holding the bearer token.
pub const TOKEN_ENV_VAR: &str = "JWT_TOKEN";

/// Bearer credential. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Base URLs of the service endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiEndpoints {
    /// Scene search pipeline
    pub search_url: String,
    /// Imagery release pipeline
    pub imagery_url: String,
    /// Car detection release pipeline
    pub cars_url: String,
    /// Pipeline status endpoint
    pub tasking_url: String,
    /// Grid file root
    pub grid_url: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            imagery_url: DEFAULT_IMAGERY_URL.to_string(),
            cars_url: DEFAULT_CARS_URL.to_string(),
            tasking_url: DEFAULT_TASKING_URL.to_string(),
            grid_url: DEFAULT_GRID_URL.to_string(),
        }
    }
}
