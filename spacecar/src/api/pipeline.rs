//! Asynchronous pipeline protocol.
//!
//! Every analysis endpoint works the same way:
//!
//! ```text
//! POST {endpoint}/initiate  → { pipelineId, nextTry }
//! POST {tasking}            → { status, nextTry }     (repeat until RESOLVED)
//! POST {endpoint}/retrieve  → result document
//! ```

use super::client::SpaceKnowClient;
use super::error::ApiError;
use super::http::AsyncHttpClient;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

/// Wait used when the service does not say when to poll next.
pub const DEFAULT_NEXT_TRY_SECS: f64 = 100.0;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitiateResponse {
    pipeline_id: String,
    #[serde(default)]
    next_try: Option<f64>,
}

/// Processing state reported by the tasking endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStatus {
    New,
    Processing,
    Resolved,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    status: PipelineStatus,
    #[serde(default)]
    next_try: Option<f64>,
}

fn wait_duration(next_try: Option<f64>) -> Result<Duration, ApiError> {
    let secs = next_try.unwrap_or(DEFAULT_NEXT_TRY_SECS);
    Duration::try_from_secs_f64(secs.max(0.0))
        .map_err(|e| ApiError::malformed("status", format!("nextTry {}: {}", secs, e)))
}

impl<C: AsyncHttpClient> SpaceKnowClient<C> {
    /// Runs one pipeline to completion and returns the retrieved document.
    pub(crate) async fn run_pipeline(
        &self,
        endpoint: &str,
        payload: Value,
    ) -> Result<Value, ApiError> {
        let initiate: InitiateResponse = serde_json::from_value(
            self.post(&format!("{}/initiate", endpoint), &payload).await?,
        )
        .map_err(|e| ApiError::malformed("initiate", e))?;

        let pipeline_id = initiate.pipeline_id;
        let mut next_try = initiate.next_try;

        loop {
            let wait = wait_duration(next_try)?;
            info!(
                pipeline_id = %pipeline_id,
                wait_secs = wait.as_secs_f64(),
                "Waiting for next pipeline status check"
            );
            tokio::time::sleep(wait).await;

            let status: StatusResponse = serde_json::from_value(
                self.post(
                    &self.endpoints().tasking_url,
                    &json!({ "pipelineId": pipeline_id }),
                )
                .await?,
            )
            .map_err(|e| ApiError::malformed("status", e))?;

            debug!(pipeline_id = %pipeline_id, status = ?status.status, "Pipeline status");

            match status.status {
                PipelineStatus::Resolved => break,
                PipelineStatus::Failed => {
                    return Err(ApiError::Service(format!(
                        "An error occurred during processing pipeline {}",
                        pipeline_id
                    )));
                }
                _ => next_try = status.next_try,
            }
        }

        self.post(
            &format!("{}/retrieve", endpoint),
            &json!({ "pipelineId": pipeline_id }),
        )
        .await
    }
}
