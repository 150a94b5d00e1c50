//! Default configuration file generation.
//!
//! `rainpaper init` writes a fully commented configuration with every key at
//! its default, aligned so the comments line up in one column.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::common::constants::*;
use crate::common::utils::private_path;

/// Create a default config file at `path`. Refuses to overwrite an existing file.
pub fn create_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", private_path(path));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    fs::write(path, default_config_content() + "\n")
        .with_context(|| format!("Failed to write config to {}", private_path(path)))?;
    Ok(())
}

fn quoted(value: &str) -> String {
    format!("\"{value}\"")
}

fn string_list(values: &[&str]) -> String {
    let items: Vec<String> = values.iter().map(|v| quoted(v)).collect();
    format!("[{}]", items.join(", "))
}

/// The commented default configuration as TOML text.
pub fn default_config_content() -> String {
    ConfigBuilder::new()
        .add_section("PATHS")
        .add_setting(
            "wallpaper_dir",
            &quoted(DEFAULT_WALLPAPER_DIR),
            "Directory holding the video wallpapers",
        )
        .add_setting(
            "sound_dir",
            &quoted(DEFAULT_SOUND_DIR),
            "Directory holding rain.wav, ambient loops and track1-7.mp3",
        )
        .add_setting(
            "host_tool",
            &quoted(DEFAULT_HOST_TOOL),
            "Wallpaper host command-line tool (host mode)",
        )
        .add_setting(
            "player",
            &quoted(DEFAULT_PLAYER),
            "Player for the wallpaper window and audio",
        )
        .add_section("TIMING")
        .add_setting(
            "morning_start",
            &DEFAULT_MORNING_START.to_string(),
            &format!("Hour the morning window starts (0-{MAXIMUM_HOUR})"),
        )
        .add_setting(
            "day_start",
            &DEFAULT_DAY_START.to_string(),
            "Hour the day window starts",
        )
        .add_setting(
            "evening_start",
            &DEFAULT_EVENING_START.to_string(),
            "Hour the evening window starts",
        )
        .add_setting(
            "night_start",
            &DEFAULT_NIGHT_START.to_string(),
            "Hour the night window starts",
        )
        .add_setting(
            "min_rain_duration",
            &DEFAULT_MIN_RAIN_DURATION.to_string(),
            "Shortest rain spell in seconds",
        )
        .add_setting(
            "max_rain_duration",
            &DEFAULT_MAX_RAIN_DURATION.to_string(),
            "Longest rain spell in seconds",
        )
        .add_setting(
            "min_clear_duration",
            &DEFAULT_MIN_CLEAR_DURATION.to_string(),
            "Shortest clear spell in seconds",
        )
        .add_setting(
            "max_clear_duration",
            &DEFAULT_MAX_CLEAR_DURATION.to_string(),
            "Longest clear spell in seconds",
        )
        .add_setting(
            "transition_duration",
            &DEFAULT_TRANSITION_DURATION.to_string(),
            "Length of the to-rain and to-clear videos in seconds",
        )
        .add_section("AUDIO")
        .add_setting(
            "background_volume",
            &DEFAULT_BACKGROUND_VOLUME.to_string(),
            "Ambient loop volume (0.0-1.0)",
        )
        .add_setting(
            "music_volume",
            &DEFAULT_MUSIC_VOLUME.to_string(),
            "Music volume (0.0-1.0)",
        )
        .add_setting(
            "rain_fade_steps",
            &DEFAULT_RAIN_FADE_STEPS.to_string(),
            &format!("Volume steps per rain fade ({MINIMUM_FADE_STEPS}-{MAXIMUM_FADE_STEPS})"),
        )
        .add_setting(
            "rain_fade_delay",
            &DEFAULT_RAIN_FADE_DELAY.to_string(),
            "Seconds between rain fade steps",
        )
        .add_setting(
            "rain_fade_ceiling",
            &DEFAULT_RAIN_FADE_CEILING.to_string(),
            "Rain volume reached by a fade-in (0.0-1.0)",
        )
        .add_setting(
            "enable_background_sounds",
            &DEFAULT_ENABLE_BACKGROUND_SOUNDS.to_string(),
            "Play rainforest.mp3 and wind.mp3 on loop",
        )
        .add_setting(
            "enable_music",
            &DEFAULT_ENABLE_MUSIC.to_string(),
            "Play the shuffled music playlist",
        )
        .add_setting(
            "enable_rain_sounds",
            &DEFAULT_ENABLE_RAIN_SOUNDS.to_string(),
            "Fade rain.wav in and out with the weather",
        )
        .add_section("DEBUG")
        .add_setting(
            "verbose_logging",
            &DEFAULT_VERBOSE_LOGGING.to_string(),
            "Print debug messages",
        )
        .add_setting(
            "show_status_updates",
            &DEFAULT_SHOW_STATUS_UPDATES.to_string(),
            "Print a status line while running",
        )
        .add_setting(
            "status_update_interval",
            &DEFAULT_STATUS_UPDATE_INTERVAL.to_string(),
            "Seconds between status lines",
        )
        .add_section("DISPLAY")
        .add_setting(
            "mode",
            &quoted("window"),
            "\"window\" (own player window) or \"host\" (external wallpaper host)",
        )
        .add_setting(
            "video_extension",
            &quoted(DEFAULT_VIDEO_EXTENSION),
            "File extension of the wallpaper videos",
        )
        .add_setting(
            "status_check_interval",
            &DEFAULT_STATUS_CHECK_INTERVAL.to_string(),
            "Seconds between time-of-day checks",
        )
        .add_setting(
            "settle_ms",
            &DEFAULT_SETTLE_MS.to_string(),
            "Host mode: pause between close and show in milliseconds",
        )
        .add_setting(
            "close_timeout",
            &DEFAULT_CLOSE_TIMEOUT.to_string(),
            "Host mode: seconds to wait for the close command",
        )
        .add_setting(
            "show_timeout",
            &DEFAULT_SHOW_TIMEOUT.to_string(),
            "Host mode: seconds to wait for the show command",
        )
        .add_setting(
            "close_args",
            &string_list(DEFAULT_CLOSE_ARGS),
            "Host mode: arguments that close all wallpapers",
        )
        .add_setting(
            "show_args",
            &string_list(DEFAULT_SHOW_ARGS),
            "Host mode: arguments that show a file ({file} is the video path)",
        )
        .add_setting(
            "show_overlay",
            &DEFAULT_SHOW_OVERLAY.to_string(),
            "Window mode: show the clock and date overlay",
        )
        .build()
}

/// Builds aligned, commented TOML.
pub struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Setting { line: String, comment: String },
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("[{title}]")));
        self
    }

    pub fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    pub fn build(self) -> String {
        // One space between the longest setting and its comment
        let width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.chars().count()),
                ConfigEntry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut lines = Vec::new();
        for entry in self.entries {
            match entry {
                ConfigEntry::Section(header) => {
                    if !lines.is_empty() {
                        lines.push(String::new());
                    }
                    lines.push(header);
                }
                ConfigEntry::Setting { line, comment } => {
                    let padding = " ".repeat(width - line.chars().count());
                    lines.push(format!("{line}{padding}{comment}"));
                }
            }
        }
        lines.join("\n")
    }
}
