//! `rainpaper assets`: show which wallpaper and sound files are in place.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::common::constants::{AMBIENT_SOUNDS, MUSIC_TRACK_COUNT, RAIN_SOUND};
use crate::common::utils::private_path;
use crate::config::{self, Config};
use crate::display::AssetResolver;
use crate::weather::all_wallpaper_names;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Video,
    Rain,
    Ambient,
    Music,
}

impl AssetKind {
    fn heading(&self) -> &'static str {
        match self {
            AssetKind::Video => "Wallpapers",
            AssetKind::Rain => "Rain sound",
            AssetKind::Ambient => "Ambient sounds",
            AssetKind::Music => "Music tracks",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetEntry {
    pub kind: AssetKind,
    pub path: PathBuf,
    pub exists: bool,
}

fn entry(kind: AssetKind, path: PathBuf) -> AssetEntry {
    let exists = path.is_file();
    AssetEntry { kind, path, exists }
}

/// Every file the daemon may look for, in display order.
pub fn expected_assets(config: &Config) -> Vec<AssetEntry> {
    let videos = AssetResolver::from_config(config);
    let sounds: &Path = &config.paths.sound_dir;

    let mut entries: Vec<AssetEntry> = all_wallpaper_names()
        .iter()
        .map(|name| entry(AssetKind::Video, videos.video_path(name)))
        .collect();

    entries.push(entry(AssetKind::Rain, sounds.join(RAIN_SOUND)));
    entries.extend(
        AMBIENT_SOUNDS
            .iter()
            .map(|name| entry(AssetKind::Ambient, sounds.join(name))),
    );
    entries.extend(
        (1..=MUSIC_TRACK_COUNT)
            .map(|n| entry(AssetKind::Music, sounds.join(format!("track{n}.mp3")))),
    );
    entries
}

pub fn handle_assets_command(config_path: Option<&Path>) -> Result<()> {
    log_version!();

    let (config, source) = config::load_or_default(config_path);
    log_block_start!("Using {}", source.describe());

    let entries = expected_assets(&config);
    let mut heading = None;
    for asset in &entries {
        if heading != Some(asset.kind) {
            log_block_start!("{}:", asset.kind.heading());
            heading = Some(asset.kind);
        }
        let mark = if asset.exists { "✓" } else { "✗" };
        log_indented!("{mark} {}", private_path(&asset.path));
    }

    let missing = entries.iter().filter(|a| !a.exists).count();
    let missing_videos = entries
        .iter()
        .filter(|a| a.kind == AssetKind::Video && !a.exists)
        .count();

    log_pipe!();
    if missing == 0 {
        log_info!("All {} files found", entries.len());
    } else {
        log_warning!("{missing} of {} files missing", entries.len());
        if missing_videos > 0 {
            log_indented!("Phases without a video keep the previous wallpaper on screen");
        }
        log_indented!("Missing sounds are skipped");
    }
    log_end!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_expected_assets_cover_every_file() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.paths.wallpaper_dir = dir.path().join("videos");
        config.paths.sound_dir = dir.path().join("sounds");

        let entries = expected_assets(&config);
        assert_eq!(entries.len(), 16 + 1 + 2 + 7);
        assert!(entries.iter().all(|e| !e.exists));
        assert!(
            entries
                .iter()
                .any(|e| e.path == dir.path().join("videos").join("rain_to_night.mov"))
        );
    }

    #[test]
    fn test_existing_files_are_marked() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.paths.wallpaper_dir = dir.path().to_path_buf();
        config.paths.sound_dir = dir.path().to_path_buf();
        config.display.video_extension = "mp4".into();
        std::fs::write(dir.path().join("evening_rain.mp4"), b"").unwrap();
        std::fs::write(dir.path().join("wind.mp3"), b"").unwrap();

        let found: Vec<_> = expected_assets(&config)
            .into_iter()
            .filter(|e| e.exists)
            .map(|e| e.kind)
            .collect();
        assert_eq!(found, [AssetKind::Video, AssetKind::Ambient]);
    }
}
