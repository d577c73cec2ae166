//! Remote API error types.

use thiserror::Error;

/// Error code the service returns for a missing, invalid or expired token.
pub const INVALID_AUTHORIZATION: &str = "INVALID-AUTHORIZATION-HEADER";

/// Errors returned by every remote call.
///
/// Both kinds are fatal for a run; nothing is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Bearer credential missing, invalid or expired
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Non-success status, transport failure or malformed response
    #[error("Service error: {0}")]
    Service(String),
}

impl ApiError {
    pub(crate) fn malformed(what: &str, err: impl std::fmt::Display) -> Self {
        ApiError::Service(format!("Malformed {} response: {}", what, err))
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, ApiError::Authentication(_))
    }
}
