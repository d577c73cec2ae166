//! CLI runner for common setup and operations.
//!
//! Encapsulates configuration loading, logging initialization and client
//! creation so `main` only deals with arguments and reporting.

use crate::error::CliError;
use spacecar::analysis::{Analysis, AnalysisOptions};
use spacecar::api::{BearerToken, ReqwestClient, SpaceKnowClient};
use spacecar::config::ConfigFile;
use spacecar::logging::{init_logging, LoggingGuard};
use std::path::PathBuf;
use tracing::info;

/// Command-line overrides applied on top of the configuration file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub days_ago: Option<u32>,
    pub max_cloud_cover: Option<f64>,
    pub output: Option<PathBuf>,
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `debug_mode` - When true, enables debug-level logging regardless of RUST_LOG
    pub fn with_debug(debug_mode: bool) -> Result<Self, CliError> {
        // Load config file (or use defaults if not present)
        let config = ConfigFile::load()?;

        let logging_guard = init_logging(&config.logging.file, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Log startup information.
    pub fn log_startup(&self) {
        info!("SpaceCar v{}", spacecar::VERSION);
        info!(
            search = %self.config.api.search_url,
            timeout = self.config.download.timeout,
            "Configuration loaded"
        );
    }

    /// Create the analysis with configuration values and CLI overrides.
    pub fn create_analysis(
        &self,
        token: BearerToken,
        overrides: Overrides,
    ) -> Result<Analysis<ReqwestClient>, CliError> {
        let options = self.options(overrides)?;

        let http = ReqwestClient::with_timeout(self.config.download.timeout)
            .map_err(CliError::Client)?;
        let client = SpaceKnowClient::new(http, token, self.config.api.endpoints())
            .map_err(CliError::Client)?;

        info!(
            days_ago = options.days_ago,
            max_cloud_cover = options.max_cloud_cover,
            output = %options.output_dir.display(),
            "Analysis created"
        );
        Ok(Analysis::new(client, options))
    }

    fn options(&self, overrides: Overrides) -> Result<AnalysisOptions, CliError> {
        let mut options = AnalysisOptions::from_config(&self.config);
        apply_overrides(&mut options, overrides)?;
        Ok(options)
    }
}

fn apply_overrides(options: &mut AnalysisOptions, overrides: Overrides) -> Result<(), CliError> {
    if let Some(days_ago) = overrides.days_ago {
        options.days_ago = days_ago;
    }
    if let Some(max_cloud_cover) = overrides.max_cloud_cover {
        if !(0.0..=1.0).contains(&max_cloud_cover) {
            return Err(CliError::InvalidArgument(format!(
                "--max-cloud-cover must be between 0 and 1, got {}",
                max_cloud_cover
            )));
        }
        options.max_cloud_cover = max_cloud_cover;
    }
    if let Some(output) = overrides.output {
        options.output_dir = output;
    }
    Ok(())
}
