//! Wallpaper presentation.
//!
//! A [`WallpaperPresenter`] turns a symbolic wallpaper name such as
//! `evening_rain` into a visible looping video. Three realizations exist:
//!
//! - **Player window** ([`player::PlayerPresenter`]): a borderless fullscreen
//!   player window owned by the daemon and driven over its IPC socket. The
//!   clock overlay is drawn through the same socket.
//! - **External host** ([`host::ExternalHostPresenter`]): a third-party
//!   wallpaper host is told to close whatever it shows and then show a file.
//! - **Dry run** ([`dry_run::DryRunPresenter`]): resolves assets and logs, used
//!   by `rainpaper simulate`.
//!
//! Presenters are owned by the display actor ([`actor`]), which serializes
//! every request and keeps the authoritative record of what is on screen.

pub mod actor;
pub mod dry_run;
pub mod host;
pub mod overlay;
pub mod player;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, DisplayMode};
use crate::io::process::CommandOutcome;
use crate::core::stop::StopSignal;
use crate::time::TimeSource;

pub use actor::{DisplayActor, DisplayHandle, DisplaySnapshot, ReconcileOutcome};

/// Why a wallpaper could not be presented.
#[derive(Debug, Clone, PartialEq)]
pub enum PresentError {
    /// The video file for the requested name does not exist
    MissingAsset(PathBuf),
    /// A host tool step failed or timed out
    Command {
        step: &'static str,
        outcome: CommandOutcome,
    },
    /// The player window could not be driven
    Player(String),
    /// Shutdown was requested before the present finished
    Interrupted,
}

impl fmt::Display for PresentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresentError::MissingAsset(path) => write!(f, "video file not found: {}", path.display()),
            PresentError::Command { step, outcome } => write!(f, "{step} {outcome}"),
            PresentError::Player(msg) => write!(f, "player error: {msg}"),
            PresentError::Interrupted => write!(f, "interrupted by shutdown"),
        }
    }
}

impl std::error::Error for PresentError {}

/// Sink that makes a named wallpaper visible.
pub trait WallpaperPresenter: Send {
    /// Make `name` the visible wallpaper.
    fn present(&mut self, name: &str) -> Result<(), PresentError>;

    /// Draw overlay text on top of the wallpaper, if supported.
    fn show_overlay(&mut self, _text: &str) {}

    /// Remove the wallpaper on shutdown.
    fn teardown(&mut self) {}

    /// Short name for log output.
    fn kind(&self) -> &'static str;
}

/// Maps wallpaper names onto video files.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    dir: PathBuf,
    extension: String,
}

impl AssetResolver {
    pub fn new(dir: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.paths.wallpaper_dir, &config.display.video_extension)
    }

    /// `{dir}/{name}.{extension}`, made absolute for external tools.
    pub fn video_path(&self, name: &str) -> PathBuf {
        let path = self.dir.join(format!("{name}.{}", self.extension));
        std::path::absolute(&path).unwrap_or(path)
    }

    /// Resolve `name` and confirm the file exists.
    pub fn locate(&self, name: &str) -> Result<PathBuf, PresentError> {
        let path = self.video_path(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(PresentError::MissingAsset(path))
        }
    }
}

/// Build the presenter selected by `[DISPLAY] mode`.
pub fn create_presenter(
    config: &Config,
    stop: StopSignal,
    time: Arc<dyn TimeSource>,
) -> Box<dyn WallpaperPresenter> {
    let assets = AssetResolver::from_config(config);

    match config.display.mode {
        DisplayMode::Host => {
            let capability = host::HostTool::from_config(config);
            if !capability.is_available() {
                log_warning!(
                    "Host tool not found at {}, wallpapers will not change",
                    config.paths.host_tool
                );
                log_indented!("Set host_tool in the [PATHS] section of the config");
            }
            Box::new(host::ExternalHostPresenter::new(
                capability,
                assets,
                Duration::from_millis(config.display.settle_ms),
                stop,
                time,
            ))
        }
        DisplayMode::Window => Box::new(player::PlayerPresenter::new(&config.paths.player, assets)),
    }
}
