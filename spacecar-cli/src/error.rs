//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use spacecar::analysis::AnalysisError;
use spacecar::api::{ApiError, TOKEN_ENV_VAR};
use spacecar::config::{config_file_path, ConfigFileError};
use spacecar::geometry::GeometryError;
use std::fmt;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be read or holds invalid values
    Config(ConfigFileError),
    /// Invalid command-line value
    InvalidArgument(String),
    /// Failed to load the area of interest
    Geometry(GeometryError),
    /// Failed to create the API client
    Client(ApiError),
    /// The analysis run failed
    Analysis(AnalysisError),
}

impl CliError {
    fn is_authentication(&self) -> bool {
        match self {
            CliError::Client(e) => e.is_authentication(),
            CliError::Analysis(e) => e.is_authentication(),
            _ => false,
        }
    }

    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if self.is_authentication() {
            eprintln!();
            eprintln!("Authentication failed. Make sure:");
            eprintln!("  1. {} holds a valid bearer token, or pass --token", TOKEN_ENV_VAR);
            eprintln!("  2. The token has not expired");
        } else if let CliError::Config(_) = self {
            eprintln!();
            eprintln!("Check the configuration file: {}", config_file_path().display());
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Geometry(e) => write!(f, "Failed to load area of interest: {}", e),
            CliError::Client(e) => write!(f, "Failed to create API client: {}", e),
            CliError::Analysis(e) => write!(f, "Analysis failed: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Geometry(e) => Some(e),
            CliError::Client(e) => Some(e),
            CliError::Analysis(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<GeometryError> for CliError {
    fn from(e: GeometryError) -> Self {
        CliError::Geometry(e)
    }
}

impl From<AnalysisError> for CliError {
    fn from(e: AnalysisError) -> Self {
        CliError::Analysis(e)
    }
}
