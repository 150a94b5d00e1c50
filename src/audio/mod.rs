//! Ambient audio: looping background sounds, a shuffled music playlist and a
//! fadable rain loop.
//!
//! Each duty is independent and failure-isolated. A missing file skips that
//! sound, a playback error is logged and retried, and if no audio backend is
//! available at all the daemon carries on silently.

pub mod fade;
pub mod mpv;
pub mod playlist;

use anyhow::Result;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::common::constants::*;
use crate::config::Config;
use crate::core::stop::StopSignal;
use crate::time::TimeSource;

pub use fade::{FadeOutcome, FadeSettings, RainFader};
pub use playlist::{MusicLoop, MusicPlaylist};

/// Playback state of the current music track.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackState {
    Playing,
    Finished,
    Failed(String),
}

/// Rain channel volume and playing flag.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AudioChannelState {
    pub volume: f64,
    pub playing: bool,
}

/// Shared, read-only view of the rain channel for the status line.
pub type RainState = Arc<Mutex<AudioChannelState>>;

/// Audio output used by the coordinator.
///
/// Volumes are in 0.0-1.0. Implementations must be shareable across the
/// weather and music threads.
pub trait Mixer: Send + Sync {
    /// Loop `path` forever at `volume`.
    fn start_ambient(&self, path: &Path, volume: f64) -> Result<()>;

    /// Start playing `path` once, replacing any current track.
    fn play_track(&self, path: &Path, volume: f64) -> Result<()>;

    fn track_state(&self) -> TrackState;

    fn stop_track(&self);

    /// Start looping the rain sound at volume 0.
    fn rain_start(&self, path: &Path) -> Result<()>;

    fn rain_set_volume(&self, volume: f64) -> Result<()>;

    fn rain_stop(&self) -> Result<()>;

    /// Stop every sound.
    fn stop_all(&self);

    /// True when nothing is actually audible.
    fn is_silent(&self) -> bool {
        false
    }
}

/// Mixer used when no audio backend is available.
pub struct SilentMixer;

impl Mixer for SilentMixer {
    fn start_ambient(&self, _path: &Path, _volume: f64) -> Result<()> {
        Ok(())
    }

    fn play_track(&self, _path: &Path, _volume: f64) -> Result<()> {
        Ok(())
    }

    fn track_state(&self) -> TrackState {
        TrackState::Finished
    }

    fn stop_track(&self) {}

    fn rain_start(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn rain_set_volume(&self, _volume: f64) -> Result<()> {
        Ok(())
    }

    fn rain_stop(&self) -> Result<()> {
        Ok(())
    }

    fn stop_all(&self) {}

    fn is_silent(&self) -> bool {
        true
    }
}

/// True if any audio duty is enabled.
pub fn audio_enabled(config: &Config) -> bool {
    config.audio.enable_background_sounds || config.audio.enable_music || config.audio.enable_rain_sounds
}

/// Pick the mixer: the player in audio-only mode, or silence.
pub fn create_mixer(config: &Config) -> Arc<dyn Mixer> {
    if !audio_enabled(config) {
        log_decorated!("All audio disabled");
        return Arc::new(SilentMixer);
    }

    match mpv::MpvMixer::probe(&config.paths.player) {
        Ok(mixer) => {
            log_decorated!("Audio initialized with {}", config.paths.player);
            Arc::new(mixer)
        }
        Err(e) => {
            log_warning!("Audio initialization failed: {e}");
            log_indented!("Running without audio...");
            Arc::new(SilentMixer)
        }
    }
}

/// Owns the mixer and hands out the per-duty workers.
pub struct AudioCoordinator {
    mixer: Arc<dyn Mixer>,
    sound_dir: PathBuf,
    background_volume: f64,
    music_volume: f64,
    fade: FadeSettings,
    enable_background_sounds: bool,
    enable_music: bool,
    enable_rain_sounds: bool,
    rain_state: RainState,
}

impl AudioCoordinator {
    pub fn new(config: &Config, mixer: Arc<dyn Mixer>) -> Self {
        Self {
            mixer,
            sound_dir: config.paths.sound_dir.clone(),
            background_volume: config.audio.background_volume,
            music_volume: config.audio.music_volume,
            fade: FadeSettings::from_config(config),
            enable_background_sounds: config.audio.enable_background_sounds,
            enable_music: config.audio.enable_music,
            enable_rain_sounds: config.audio.enable_rain_sounds,
            rain_state: Arc::new(Mutex::new(AudioChannelState::default())),
        }
    }

    pub fn rain_state(&self) -> RainState {
        self.rain_state.clone()
    }

    /// Start every existing ambient loop. Returns how many started.
    pub fn start_ambient(&self) -> usize {
        if !self.enable_background_sounds {
            return 0;
        }

        let mut started = 0;
        for name in AMBIENT_SOUNDS {
            let path = self.sound_dir.join(name);
            if !path.is_file() {
                log_indented!("Ambient sound not found, skipping: {name}");
                continue;
            }
            match self.mixer.start_ambient(&path, self.background_volume) {
                Ok(()) => {
                    log_indented!("Loaded ambient sound: {name}");
                    started += 1;
                }
                Err(e) => log_error!("Failed to start ambient sound {name}: {e}"),
            }
        }
        started
    }

    /// Fader for the rain loop, if rain sounds are enabled and present.
    pub fn rain_fader(&self) -> Option<RainFader> {
        if !self.enable_rain_sounds {
            return None;
        }

        let path = self.sound_dir.join(RAIN_SOUND);
        if !path.is_file() {
            log_indented!("Rain sound not found, rain will be silent: {RAIN_SOUND}");
            return None;
        }
        log_indented!("Loaded rain sound: {RAIN_SOUND}");

        Some(RainFader::new(
            self.mixer.clone(),
            path,
            self.fade,
            self.rain_state.clone(),
        ))
    }

    /// Music worker over the shuffled playlist, if enabled and any tracks exist.
    pub fn music_loop<R: Rng>(
        &self,
        rng: &mut R,
        stop: StopSignal,
        time: Arc<dyn TimeSource>,
    ) -> Option<MusicLoop> {
        if !self.enable_music || self.mixer.is_silent() {
            return None;
        }

        let tracks = playlist::discover_tracks(&self.sound_dir);
        if tracks.is_empty() {
            log_indented!("No music tracks found in sound directory");
            return None;
        }

        let playlist = MusicPlaylist::shuffled(tracks, rng);
        log_indented!("Music playlist loaded with {} tracks", playlist.len());

        Some(MusicLoop::new(
            playlist,
            self.mixer.clone(),
            self.music_volume,
            Duration::from_millis(MUSIC_RETRY_BACKOFF_MS),
            stop,
            time,
        ))
    }

    /// Stop all sound.
    pub fn shutdown(&self) {
        self.mixer.stop_all();
        if let Ok(mut state) = self.rain_state.lock() {
            *state = AudioChannelState::default();
        }
    }
}
