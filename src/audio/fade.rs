//! Rain loop fades.
//!
//! A fade is `steps` volume updates separated by `delay`. Fading in starts the
//! loop at zero and climbs linearly toward the ceiling; fading out mirrors it
//! and then stops the loop. The stop signal is checked at every step, and an
//! interrupted fade stays at whatever volume it had reached.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::{AudioChannelState, Mixer, RainState};
use crate::config::Config;
use crate::core::stop::StopSignal;
use crate::time::TimeSource;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeSettings {
    pub steps: u32,
    pub delay: Duration,
    pub ceiling: f64,
}

impl FadeSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            steps: config.audio.rain_fade_steps.max(1),
            delay: Duration::from_secs_f64(config.audio.rain_fade_delay.max(0.0)),
            ceiling: config.audio.rain_fade_ceiling.clamp(0.0, 1.0),
        }
    }

    /// Total time a complete fade takes.
    pub fn duration(&self) -> Duration {
        self.delay * self.steps
    }
}

/// Volume at step `i` of a fade-in: `i / steps * ceiling`.
pub fn fade_in_volume(i: u32, steps: u32, ceiling: f64) -> f64 {
    let steps = steps.max(1);
    (f64::from(i) / f64::from(steps) * ceiling).clamp(0.0, 1.0)
}

/// Volume at step `i` of a fade-out: `(steps - i) / steps * ceiling`.
pub fn fade_out_volume(i: u32, steps: u32, ceiling: f64) -> f64 {
    let steps = steps.max(1);
    let remaining = steps.saturating_sub(i);
    (f64::from(remaining) / f64::from(steps) * ceiling).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, PartialEq)]
pub enum FadeOutcome {
    Completed,
    /// Stop was requested before step `at_step` ran
    Aborted { at_step: u32 },
    /// Already in the requested state
    Skipped,
    /// The rain loop could not be started or stopped
    Failed(String),
}

/// Drives the rain channel for the weather cycle.
pub struct RainFader {
    mixer: Arc<dyn Mixer>,
    path: PathBuf,
    settings: FadeSettings,
    state: RainState,
}

impl RainFader {
    pub fn new(mixer: Arc<dyn Mixer>, path: PathBuf, settings: FadeSettings, state: RainState) -> Self {
        Self {
            mixer,
            path,
            settings,
            state,
        }
    }

    pub fn state(&self) -> AudioChannelState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, volume: f64, playing: bool) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.volume = volume;
        state.playing = playing;
    }

    fn apply_volume(&self, volume: f64) {
        if let Err(e) = self.mixer.rain_set_volume(volume) {
            log_debug!("Rain volume update failed: {e}");
        }
        self.set_state(volume, true);
    }

    /// Start the rain loop and raise it to the ceiling. No-op if already playing.
    pub fn fade_in(&self, stop: &StopSignal, time: &dyn TimeSource) -> FadeOutcome {
        if self.state().playing {
            return FadeOutcome::Skipped;
        }

        if let Err(e) = self.mixer.rain_start(&self.path) {
            log_error!("Error starting rain sound: {e}");
            return FadeOutcome::Failed(e.to_string());
        }
        self.set_state(0.0, true);

        let FadeSettings {
            steps,
            delay,
            ceiling,
        } = self.settings;
        for i in 0..steps {
            if !stop.is_running() {
                return FadeOutcome::Aborted { at_step: i };
            }
            self.apply_volume(fade_in_volume(i, steps, ceiling));
            stop.sleep_in_chunks(delay, delay, time);
        }

        log_decorated!("Rain sound started");
        FadeOutcome::Completed
    }

    /// Lower the rain loop to silence and stop it. No-op if not playing.
    pub fn fade_out(&self, stop: &StopSignal, time: &dyn TimeSource) -> FadeOutcome {
        if !self.state().playing {
            return FadeOutcome::Skipped;
        }

        let FadeSettings {
            steps,
            delay,
            ceiling,
        } = self.settings;
        for i in 0..steps {
            if !stop.is_running() {
                return FadeOutcome::Aborted { at_step: i };
            }
            self.apply_volume(fade_out_volume(i, steps, ceiling));
            stop.sleep_in_chunks(delay, delay, time);
        }

        if let Err(e) = self.mixer.rain_stop() {
            log_error!("Error stopping rain sound: {e}");
            return FadeOutcome::Failed(e.to_string());
        }
        self.set_state(0.0, false);

        log_decorated!("Rain sound stopped");
        FadeOutcome::Completed
    }
}
