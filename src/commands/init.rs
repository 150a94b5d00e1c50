//! `rainpaper init`: write a commented default configuration.

use anyhow::Result;
use std::path::Path;

use super::resolve_config_path;
use crate::common::utils::private_path;
use crate::config::create_default_config;

pub fn handle_init_command(config_path: Option<&Path>) -> Result<()> {
    log_version!();

    let path = resolve_config_path(config_path)?;
    if path.exists() {
        log_block_start!("Configuration already exists:");
        log_indented!("{}", private_path(&path));
        log_indented!("Remove it first to regenerate the defaults");
        log_end!();
        return Ok(());
    }

    create_default_config(&path)?;
    log_block_start!("Created default configuration:");
    log_indented!("{}", private_path(&path));
    log_indented!("Point wallpaper_dir and sound_dir at your files, then run 'rainpaper'");
    log_end!();
    Ok(())
}
