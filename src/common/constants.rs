//! Application-wide constants and default values.
//!
//! Defaults mirror the values written by `rainpaper init`, so a missing config
//! file and a freshly generated one behave the same.

// # Application Configuration Defaults

// Paths
pub const DEFAULT_WALLPAPER_DIR: &str = "wallpapers";
pub const DEFAULT_SOUND_DIR: &str = "sounds";
pub const DEFAULT_HOST_TOOL: &str = "livelycu";
pub const DEFAULT_PLAYER: &str = "mpv";

// Time window thresholds (hours, 0-23)
pub const DEFAULT_MORNING_START: u32 = 5;
pub const DEFAULT_DAY_START: u32 = 12;
pub const DEFAULT_EVENING_START: u32 = 17;
pub const DEFAULT_NIGHT_START: u32 = 20;

// Weather cycle durations (seconds)
pub const DEFAULT_MIN_RAIN_DURATION: u64 = 30;
pub const DEFAULT_MAX_RAIN_DURATION: u64 = 300;
pub const DEFAULT_MIN_CLEAR_DURATION: u64 = 60;
pub const DEFAULT_MAX_CLEAR_DURATION: u64 = 300;
pub const DEFAULT_TRANSITION_DURATION: u64 = 8;

// Audio
pub const DEFAULT_BACKGROUND_VOLUME: f64 = 0.3;
pub const DEFAULT_MUSIC_VOLUME: f64 = 0.1;
pub const DEFAULT_RAIN_FADE_STEPS: u32 = 20;
pub const DEFAULT_RAIN_FADE_DELAY: f64 = 0.25; // seconds
pub const DEFAULT_RAIN_FADE_CEILING: f64 = 0.5;
pub const DEFAULT_ENABLE_BACKGROUND_SOUNDS: bool = true;
pub const DEFAULT_ENABLE_MUSIC: bool = true;
pub const DEFAULT_ENABLE_RAIN_SOUNDS: bool = true;

// Debug
pub const DEFAULT_VERBOSE_LOGGING: bool = false;
pub const DEFAULT_SHOW_STATUS_UPDATES: bool = true;
pub const DEFAULT_STATUS_UPDATE_INTERVAL: u64 = 5; // seconds

// Display
pub const DEFAULT_VIDEO_EXTENSION: &str = "mov";
pub const DEFAULT_STATUS_CHECK_INTERVAL: u64 = 60; // seconds
pub const DEFAULT_SETTLE_MS: u64 = 1000;
pub const DEFAULT_CLOSE_TIMEOUT: u64 = 10; // seconds
pub const DEFAULT_SHOW_TIMEOUT: u64 = 15; // seconds
pub const DEFAULT_SHOW_OVERLAY: bool = true;
pub const DEFAULT_CLOSE_ARGS: &[&str] = &["closewp", "--monitor", "-1"];
pub const DEFAULT_SHOW_ARGS: &[&str] = &["setwp", "--file", "{file}"];

/// Placeholder substituted with the absolute video path in `show_args`.
pub const FILE_PLACEHOLDER: &str = "{file}";

// # Validation Limits

pub const MAXIMUM_HOUR: u32 = 23;
pub const MINIMUM_FADE_STEPS: u32 = 1;
pub const MAXIMUM_FADE_STEPS: u32 = 1000;
pub const MAXIMUM_FADE_DELAY: f64 = 10.0; // seconds
pub const MINIMUM_STATUS_INTERVAL: u64 = 1;
pub const MAXIMUM_STATUS_INTERVAL: u64 = 3600;
pub const MAXIMUM_SETTLE_MS: u64 = 60_000;

// # Assets

pub const RAIN_SOUND: &str = "rain.wav";
pub const AMBIENT_SOUNDS: &[&str] = &["rainforest.mp3", "wind.mp3"];
pub const MUSIC_TRACK_COUNT: usize = 7;

// # Timing

/// Longest uninterrupted sleep before the stop signal is re-checked.
pub const STOP_CHECK_INTERVAL_MS: u64 = 1000;
/// Backoff after a failed track before retrying it.
pub const MUSIC_RETRY_BACKOFF_MS: u64 = 1000;
/// Poll interval while a track is playing.
pub const MUSIC_POLL_INTERVAL_MS: u64 = 100;
/// Subprocess poll interval while waiting on a timeout.
pub const PROCESS_POLL_INTERVAL_MS: u64 = 50;
/// Overlay refresh period (window mode).
pub const OVERLAY_REFRESH_MS: u64 = 1000;

// # Player IPC

pub const SOCKET_TIMEOUT_MS: u64 = 1000;
pub const SOCKET_CONNECT_RETRIES: u32 = 20;
pub const SOCKET_CONNECT_RETRY_MS: u64 = 100;

// # Exit Codes

pub const EXIT_FAILURE: i32 = 1;
