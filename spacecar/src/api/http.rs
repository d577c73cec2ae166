//! HTTP client abstraction for testability

use super::error::ApiError;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Status and body of a completed HTTP exchange.
///
/// Non-success statuses are returned as values, not errors, because the
/// service encodes its error codes in the body.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 response with a JSON body.
    pub fn json(value: &Value) -> Self {
        Self::new(200, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for asynchronous HTTP client operations.
///
/// Every request carries the bearer token in the `Authorization` header.
/// Implementations return `ApiError::Service` only for transport failures.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP POST request with a JSON body.
    fn post_json(
        &self,
        url: &str,
        bearer_token: &str,
        body: &Value,
    ) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send;

    /// Performs an async HTTP GET request.
    fn get(
        &self,
        url: &str,
        bearer_token: &str,
    ) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send;
}

/// Async HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

/// User-Agent sent with every request.
const USER_AGENT: &str = concat!("spacecar/", env!("CARGO_PKG_VERSION"));

impl ReqwestClient {
    /// Creates a new client with the given request timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| ApiError::Service(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn execute(
        &self,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<HttpResponse, ApiError> {
        let response = match request.send().await {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(ApiError::Service(format!("Request to {} failed: {}", url, e)));
            }
        };

        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(bytes) => {
                trace!(url = url, bytes = bytes.len(), "HTTP response body read");
                Ok(HttpResponse::new(status, bytes.to_vec()))
            }
            Err(e) => {
                warn!(url = url, error = %e, "Failed to read response body");
                Err(ApiError::Service(format!(
                    "Failed to read response from {}: {}",
                    url, e
                )))
            }
        }
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn post_json(
        &self,
        url: &str,
        bearer_token: &str,
        body: &Value,
    ) -> Result<HttpResponse, ApiError> {
        trace!(url = url, "HTTP POST request starting");
        let request = self
            .client
            .post(url)
            .bearer_auth(bearer_token)
            .header("Content-Type", "application/json")
            .body(body.to_string());
        self.execute(url, request).await
    }

    async fn get(&self, url: &str, bearer_token: &str) -> Result<HttpResponse, ApiError> {
        trace!(url = url, "HTTP GET request starting");
        let request = self.client.get(url).bearer_auth(bearer_token);
        self.execute(url, request).await
    }
}
