//! One-shot command handlers.
//!
//! Each subcommand besides the daemon itself lives in its own module.

pub mod assets;
pub mod init;
pub mod simulate;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The config file a command should act on: `--config` if given, otherwise
/// the default location.
pub(crate) fn resolve_config_path(config_path: Option<&Path>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path.to_path_buf()),
        None => crate::config::get_config_path(),
    }
}
