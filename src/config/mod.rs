//! Configuration module for search-summarizer
//!
//! Handles loading and validating settings from YAML files and environment variables.
//! Settings are loaded once at startup and passed to components by value.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_ENV: &str = "SUMMARIZER_SETTINGS_PATH";

/// Configuration problems detected at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required credential: {0}")]
    Missing(&'static str),

    #[error("unknown language-model backend: {0}")]
    UnknownBackend(String),

    #[error("invalid URL '{0}': {1}")]
    InvalidUrl(String, url::ParseError),

    #[error("{0} must be a positive number of seconds, got {1}")]
    InvalidTimeout(&'static str, f64),
}

/// Load settings from an explicit file, a default location, or defaults,
/// then apply environment overrides.
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        info!("Loading settings from: {}", path.display());
        let mut settings = Settings::from_file(path)?;
        settings.merge_env();
        return Ok(settings);
    }

    for path in default_paths() {
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(&path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    info!("No settings file found, using defaults");
    let mut settings = Settings::default();
    settings.merge_env();
    Ok(settings)
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("search-summarizer/settings.yml"));
    }
    paths
}
