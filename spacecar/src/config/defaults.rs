//! Default values for all configuration settings.

use std::path::PathBuf;

use super::settings::*;

// =============================================================================
// Service endpoints
// =============================================================================

pub const DEFAULT_SEARCH_URL: &str = "https://spaceknow-imagery.appspot.com/imagery/search";
pub const DEFAULT_IMAGERY_URL: &str =
    "https://spaceknow-kraken.appspot.com/kraken/release/imagery/geojson";
pub const DEFAULT_CARS_URL: &str =
    "https://spaceknow-kraken.appspot.com/kraken/release/cars/geojson";
pub const DEFAULT_TASKING_URL: &str = "https://spaceknow-tasking.appspot.com/tasking/get-status";
pub const DEFAULT_GRID_URL: &str = "https://spaceknow-kraken.appspot.com/kraken/grid";

// =============================================================================
// Search
// =============================================================================

pub const DEFAULT_SEARCH_PROVIDER: &str = "gbdx";
pub const DEFAULT_SEARCH_DATASET: &str = "idaho-pansharpened";
pub const DEFAULT_DAYS_AGO: u32 = 90;
pub const DEFAULT_MAX_CLOUD_COVER: f64 = 0.30;

// =============================================================================
// Download, output, logging
// =============================================================================

pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_FILE: &str = "spacecar.log";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            api: ApiSettings {
                search_url: DEFAULT_SEARCH_URL.to_string(),
                imagery_url: DEFAULT_IMAGERY_URL.to_string(),
                cars_url: DEFAULT_CARS_URL.to_string(),
                tasking_url: DEFAULT_TASKING_URL.to_string(),
                grid_url: DEFAULT_GRID_URL.to_string(),
            },
            search: SearchSettings {
                provider: DEFAULT_SEARCH_PROVIDER.to_string(),
                dataset: DEFAULT_SEARCH_DATASET.to_string(),
                days_ago: DEFAULT_DAYS_AGO,
                max_cloud_cover: DEFAULT_MAX_CLOUD_COVER,
            },
            download: DownloadSettings {
                timeout: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            },
            output: OutputSettings {
                directory: PathBuf::from(DEFAULT_OUTPUT_DIR),
            },
            logging: LoggingSettings {
                file: PathBuf::from(DEFAULT_LOG_DIR).join(DEFAULT_LOG_FILE),
            },
        }
    }
}
