//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::{Ini, Properties};
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [api] section
    if let Some(section) = ini.section(Some("api")) {
        let api = &mut config.api;
        for (key, target) in [
            ("search_url", &mut api.search_url),
            ("imagery_url", &mut api.imagery_url),
            ("cars_url", &mut api.cars_url),
            ("tasking_url", &mut api.tasking_url),
            ("grid_url", &mut api.grid_url),
        ] {
            if let Some(v) = section.get(key) {
                *target = parse_url("api", key, v)?;
            }
        }
    }

    // [search] section
    if let Some(section) = ini.section(Some("search")) {
        if let Some(v) = non_empty(section, "provider") {
            config.search.provider = v.to_string();
        }
        if let Some(v) = non_empty(section, "dataset") {
            config.search.dataset = v.to_string();
        }
        if let Some(v) = section.get("days_ago") {
            config.search.days_ago =
                parse_value("search", "days_ago", v, "must be a non-negative integer (days)")?;
        }
        if let Some(v) = section.get("max_cloud_cover") {
            let reason = "must be a number between 0.0 and 1.0";
            let parsed: f64 = parse_value("search", "max_cloud_cover", v, reason)?;
            if !(0.0..=1.0).contains(&parsed) {
                return Err(invalid("search", "max_cloud_cover", v, reason));
            }
            config.search.max_cloud_cover = parsed;
        }
    }

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("timeout") {
            let reason = "must be a positive integer (seconds)";
            let parsed: u64 = parse_value("download", "timeout", v, reason)?;
            if parsed == 0 {
                return Err(invalid("download", "timeout", v, reason));
            }
            config.download.timeout = parsed;
        }
    }

    // [output] section
    if let Some(section) = ini.section(Some("output")) {
        if let Some(v) = non_empty(section, "directory") {
            config.output.directory = expand_tilde(v);
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "file") {
            config.logging.file = expand_tilde(v);
        }
    }

    Ok(config)
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_value<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn parse_url(section: &str, key: &str, value: &str) -> Result<String, ConfigFileError> {
    let v = value.trim().trim_end_matches('/');
    if !(v.starts_with("http://") || v.starts_with("https://")) {
        return Err(invalid(
            section,
            key,
            value,
            "must be an http:// or https:// URL",
        ));
    }
    Ok(v.to_string())
}

pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
