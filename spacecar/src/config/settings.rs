//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use crate::api::ApiEndpoints;
use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    /// Service endpoints
    pub api: ApiSettings,
    /// Scene search settings
    pub search: SearchSettings,
    /// Download settings
    pub download: DownloadSettings,
    /// Output settings
    pub output: OutputSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Service endpoint URLs.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    pub search_url: String,
    pub imagery_url: String,
    pub cars_url: String,
    pub tasking_url: String,
    pub grid_url: String,
}

impl ApiSettings {
    pub fn endpoints(&self) -> ApiEndpoints {
        ApiEndpoints {
            search_url: self.search_url.clone(),
            imagery_url: self.imagery_url.clone(),
            cars_url: self.cars_url.clone(),
            tasking_url: self.tasking_url.clone(),
            grid_url: self.grid_url.clone(),
        }
    }
}

/// Scene search configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    /// Imagery provider queried by the search
    pub provider: String,
    /// Imagery dataset queried by the search
    pub dataset: String,
    /// How far back to look for scenes
    pub days_ago: u32,
    /// Maximum cloud cover (0.0 - 1.0) for a scene to be preferred
    pub max_cloud_cover: f64,
}

/// Download configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSettings {
    /// Timeout in seconds for each HTTP request.
    pub timeout: u64,
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    /// Root directory receiving one sub-directory per run
    pub directory: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
