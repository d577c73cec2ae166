//! Configuration file handling.
//!
//! Settings live in an INI file at `~/.spacecar/config.ini`. Every key is
//! optional; a missing file yields the defaults.
//!
//! ```ini
//! [api]
//! search_url = https://spaceknow-imagery.appspot.com/imagery/search
//!
//! [search]
//! days_ago = 90
//! max_cloud_cover = 0.3
//!
//! [output]
//! directory = ~/spacecar/output
//! ```

mod defaults;
mod file;
mod parser;
mod settings;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ApiSettings, ConfigFile, DownloadSettings, LoggingSettings, OutputSettings, SearchSettings,
};
