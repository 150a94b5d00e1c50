//! Configuration for rainpaper.
//!
//! Settings are read once at startup from `rainpaper.toml` and never change
//! afterwards. The file is split into five sections, each of which may be
//! written in upper or lower case (`[TIMING]` and `[timing]` are the same):
//!
//! ```toml
//! [PATHS]
//! wallpaper_dir = "wallpapers"    # Directory holding the video wallpapers
//! sound_dir = "sounds"            # Directory holding rain.wav, ambient loops and tracks
//! host_tool = "livelycu"          # Host wallpaper tool (host mode only)
//! player = "mpv"                  # Player used for the window and for audio
//!
//! [TIMING]
//! morning_start = 5               # Hour the morning window starts (0-23)
//! day_start = 12
//! evening_start = 17
//! night_start = 20
//! min_rain_duration = 30          # Seconds
//! max_rain_duration = 300
//! min_clear_duration = 60
//! max_clear_duration = 300
//! transition_duration = 8
//!
//! [AUDIO]
//! background_volume = 0.3         # 0.0-1.0
//! music_volume = 0.1
//! rain_fade_steps = 20
//! rain_fade_delay = 0.25          # Seconds between fade steps
//! rain_fade_ceiling = 0.5         # Rain volume at the end of a fade-in
//! enable_background_sounds = true
//! enable_music = true
//! enable_rain_sounds = true
//!
//! [DEBUG]
//! verbose_logging = false
//! show_status_updates = true
//! status_update_interval = 5      # Seconds
//!
//! [DISPLAY]
//! mode = "window"                 # "window" or "host"
//! video_extension = "mov"
//! status_check_interval = 60      # Seconds between time-window checks
//! settle_ms = 1000                # Host mode: pause between close and show
//! close_timeout = 10              # Host mode: seconds
//! show_timeout = 15
//! close_args = ["closewp", "--monitor", "-1"]
//! show_args = ["setwp", "--file", "{file}"]
//! show_overlay = true             # Window mode: clock and date overlay
//! ```
//!
//! Every key is optional. A missing file, a file that fails to parse and a
//! file with out-of-range values all fall back to the built-in defaults.

pub mod builder;
pub mod loading;
pub mod validation;

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::common::constants::*;
use crate::common::utils::private_path;
use crate::time::Thresholds;
use crate::weather::WeatherTiming;

pub use builder::{ConfigBuilder, create_default_config};
pub use loading::{ConfigSource, get_config_path, load, load_from_path, load_or_default};
pub use validation::validate_config;

/// How wallpapers are put on screen.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// A fullscreen player window owned by rainpaper
    #[default]
    Window,
    /// An external wallpaper host driven through its command-line tool
    Host,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Window => "window",
            DisplayMode::Host => "host",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    pub wallpaper_dir: PathBuf,
    pub sound_dir: PathBuf,
    #[serde(alias = "livelycu_path")]
    pub host_tool: String,
    pub player: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            wallpaper_dir: PathBuf::from(DEFAULT_WALLPAPER_DIR),
            sound_dir: PathBuf::from(DEFAULT_SOUND_DIR),
            host_tool: DEFAULT_HOST_TOOL.to_string(),
            player: DEFAULT_PLAYER.to_string(),
        }
    }
}

/// Time-window thresholds (hours) and weather durations (seconds).
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub morning_start: u32,
    pub day_start: u32,
    pub evening_start: u32,
    pub night_start: u32,
    pub min_rain_duration: u64,
    pub max_rain_duration: u64,
    pub min_clear_duration: u64,
    pub max_clear_duration: u64,
    pub transition_duration: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            morning_start: DEFAULT_MORNING_START,
            day_start: DEFAULT_DAY_START,
            evening_start: DEFAULT_EVENING_START,
            night_start: DEFAULT_NIGHT_START,
            min_rain_duration: DEFAULT_MIN_RAIN_DURATION,
            max_rain_duration: DEFAULT_MAX_RAIN_DURATION,
            min_clear_duration: DEFAULT_MIN_CLEAR_DURATION,
            max_clear_duration: DEFAULT_MAX_CLEAR_DURATION,
            transition_duration: DEFAULT_TRANSITION_DURATION,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub background_volume: f64,
    pub music_volume: f64,
    pub rain_fade_steps: u32,
    pub rain_fade_delay: f64,
    pub rain_fade_ceiling: f64,
    pub enable_background_sounds: bool,
    pub enable_music: bool,
    pub enable_rain_sounds: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            background_volume: DEFAULT_BACKGROUND_VOLUME,
            music_volume: DEFAULT_MUSIC_VOLUME,
            rain_fade_steps: DEFAULT_RAIN_FADE_STEPS,
            rain_fade_delay: DEFAULT_RAIN_FADE_DELAY,
            rain_fade_ceiling: DEFAULT_RAIN_FADE_CEILING,
            enable_background_sounds: DEFAULT_ENABLE_BACKGROUND_SOUNDS,
            enable_music: DEFAULT_ENABLE_MUSIC,
            enable_rain_sounds: DEFAULT_ENABLE_RAIN_SOUNDS,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    pub verbose_logging: bool,
    pub show_status_updates: bool,
    pub status_update_interval: u64,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            verbose_logging: DEFAULT_VERBOSE_LOGGING,
            show_status_updates: DEFAULT_SHOW_STATUS_UPDATES,
            status_update_interval: DEFAULT_STATUS_UPDATE_INTERVAL,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub mode: DisplayMode,
    pub video_extension: String,
    pub status_check_interval: u64,
    pub settle_ms: u64,
    pub close_timeout: u64,
    pub show_timeout: u64,
    pub close_args: Vec<String>,
    /// `{file}` is replaced with the absolute video path
    pub show_args: Vec<String>,
    pub show_overlay: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::default(),
            video_extension: DEFAULT_VIDEO_EXTENSION.to_string(),
            status_check_interval: DEFAULT_STATUS_CHECK_INTERVAL,
            settle_ms: DEFAULT_SETTLE_MS,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
            show_timeout: DEFAULT_SHOW_TIMEOUT,
            close_args: DEFAULT_CLOSE_ARGS.iter().map(|s| s.to_string()).collect(),
            show_args: DEFAULT_SHOW_ARGS.iter().map(|s| s.to_string()).collect(),
            show_overlay: DEFAULT_SHOW_OVERLAY,
        }
    }
}

/// Complete rainpaper configuration.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    #[serde(alias = "PATHS")]
    pub paths: PathsConfig,
    #[serde(alias = "TIMING")]
    pub timing: TimingConfig,
    #[serde(alias = "AUDIO")]
    pub audio: AudioConfig,
    #[serde(alias = "DEBUG")]
    pub debug: DebugConfig,
    #[serde(alias = "DISPLAY")]
    pub display: DisplayConfig,
}

impl Config {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            morning_start: self.timing.morning_start,
            day_start: self.timing.day_start,
            evening_start: self.timing.evening_start,
            night_start: self.timing.night_start,
        }
    }

    pub fn weather_timing(&self) -> WeatherTiming {
        WeatherTiming {
            transition: self.timing.transition_duration,
            min_rain: self.timing.min_rain_duration,
            max_rain: self.timing.max_rain_duration,
            min_clear: self.timing.min_clear_duration,
            max_clear: self.timing.max_clear_duration,
        }
    }

    pub fn status_check_interval(&self) -> Duration {
        Duration::from_secs(self.display.status_check_interval)
    }

    /// Print the effective configuration.
    pub fn log_config(&self, source: &str) {
        log_block_start!("Loaded {source}");

        log_indented!("Display mode: {}", self.display.mode);
        log_indented!("Wallpapers: {}", private_path(&self.paths.wallpaper_dir));
        log_indented!("Sounds: {}", private_path(&self.paths.sound_dir));
        match self.display.mode {
            DisplayMode::Host => log_indented!("Host tool: {}", self.paths.host_tool),
            DisplayMode::Window => log_indented!("Player: {}", self.paths.player),
        }

        let t = &self.timing;
        log_indented!(
            "Windows: morning {:02}:00, day {:02}:00, evening {:02}:00, night {:02}:00",
            t.morning_start,
            t.day_start,
            t.evening_start,
            t.night_start
        );
        log_indented!(
            "Rain: {}-{}s, clear: {}-{}s, transitions: {}s",
            t.min_rain_duration,
            t.max_rain_duration,
            t.min_clear_duration,
            t.max_clear_duration,
            t.transition_duration
        );

        let a = &self.audio;
        let toggle = |enabled: bool| if enabled { "on" } else { "off" };
        log_indented!(
            "Audio: ambient {} @ {:.2}, music {} @ {:.2}, rain {}",
            toggle(a.enable_background_sounds),
            a.background_volume,
            toggle(a.enable_music),
            a.music_volume,
            toggle(a.enable_rain_sounds)
        );
        if a.enable_rain_sounds {
            log_indented!(
                "Rain fade: {} steps every {}s up to {:.2}",
                a.rain_fade_steps,
                a.rain_fade_delay,
                a.rain_fade_ceiling
            );
        }
    }
}
