//! Configuration loading
//!
//! Reads a TOML file given on the command line, or falls back to the
//! default configuration compiled into the binary.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use thermolcd_core::config::{MAX_COLUMNS, MAX_PAGES};

use super::{AppConfig, DisplayKind};

/// Rows an HD44780 controller can address
const MAX_ROWS: u8 = 4;

/// Default configuration compiled into the binary
///
/// Edit thermolcd.toml and rebuild to change it.
pub const EMBEDDED_CONFIG: &str = include_str!("../../thermolcd.toml");

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Load configuration from `path`, or the embedded default when `None`
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let config = parse(&text)?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => {
            let config = parse(EMBEDDED_CONFIG)?;
            info!("Using embedded default configuration");
            Ok(config)
        }
    }
}

/// Parse and validate TOML text
pub fn parse(text: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(text)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    config
        .schedule
        .validate()
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;

    if config.pages.is_empty() {
        return Err(ConfigError::Invalid("at least one [[page]] is required".into()));
    }
    if config.pages.len() > MAX_PAGES {
        return Err(ConfigError::Invalid(format!(
            "at most {} pages are supported, found {}",
            MAX_PAGES,
            config.pages.len()
        )));
    }

    let display = &config.display;
    if !(1..=MAX_COLUMNS).contains(&display.columns) || !(2..=MAX_ROWS).contains(&display.rows) {
        return Err(ConfigError::Invalid(format!(
            "display must be 1-{} columns by 2-{} rows, got {}x{}",
            MAX_COLUMNS, MAX_ROWS, display.columns, display.rows
        )));
    }
    if display.kind == DisplayKind::Hd44780 && !matches!(display.pins.data.len(), 4 | 8) {
        return Err(ConfigError::Invalid(format!(
            "HD44780 needs 4 or 8 data pins, got {}",
            display.pins.data.len()
        )));
    }

    if config.sensor.retries == 0 {
        return Err(ConfigError::Invalid("sensor retries must be positive".into()));
    }
    if config.sensor.poll_ms == 0 {
        return Err(ConfigError::Invalid("sensor poll_ms must be positive".into()));
    }
    Ok(())
}
