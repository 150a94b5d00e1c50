//! Configuration loading.
//!
//! Loading is strict in [`load_from_path`] (any read, parse or validation
//! problem is an error) and forgiving in [`load_or_default`], which is what the
//! daemon uses: problems are logged and the built-in defaults take over.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;
use super::validation::validate_config;
use crate::common::utils::private_path;

/// Default location: `$XDG_CONFIG_HOME/rainpaper/rainpaper.toml`.
pub fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("rainpaper").join("rainpaper.toml"))
}

/// Load and validate the configuration at `path`.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", private_path(path)))?;

    validate_config(&config)
        .with_context(|| format!("Invalid configuration in {}", private_path(path)))?;

    Ok(config)
}

/// Load from the default location. A missing file yields the defaults.
pub fn load() -> Result<Config> {
    let path = get_config_path()?;
    if !path.exists() {
        return Ok(Config::default());
    }
    load_from_path(&path)
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No file was found at this path
    Missing(PathBuf),
    /// The file existed but could not be used
    Rejected(PathBuf),
    /// No config location could be determined
    Unknown,
}

impl ConfigSource {
    pub fn describe(&self) -> String {
        match self {
            ConfigSource::File(path) => format!("configuration from {}", private_path(path)),
            ConfigSource::Missing(_) | ConfigSource::Rejected(_) | ConfigSource::Unknown => {
                "default configuration".to_string()
            }
        }
    }
}

/// Load from `path` (or the default location), falling back to the defaults
/// on any problem.
pub fn load_or_default(path: Option<&Path>) -> (Config, ConfigSource) {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match get_config_path() {
            Ok(path) => path,
            Err(e) => {
                log_warning!("{e}, using defaults");
                return (Config::default(), ConfigSource::Unknown);
            }
        },
    };

    if !path.exists() {
        log_block_start!("Config file {} not found, using defaults", private_path(&path));
        log_indented!("Run 'rainpaper init' to create one");
        return (Config::default(), ConfigSource::Missing(path));
    }

    match load_from_path(&path) {
        Ok(config) => (config, ConfigSource::File(path)),
        Err(e) => {
            log_pipe!();
            log_warning!("{e}");
            for cause in e.chain().skip(1) {
                log_indented!("{cause}");
            }
            log_indented!("Using default configuration");
            (Config::default(), ConfigSource::Rejected(path))
        }
    }
}
