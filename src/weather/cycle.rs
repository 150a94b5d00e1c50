//! The weather cycle loop.
//!
//! Starting from clear sky, the cycle repeats
//! clear → transitioning to rain → rain → transitioning to clear → clear.
//! On entering a phase it reads the time window once, asks the display actor
//! to present the matching wallpaper, runs the rain fade that belongs to the
//! phase, then holds for the phase's duration. A failed present is logged by
//! the actor and the cycle moves on regardless.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use super::{WeatherPhase, WeatherTiming, wallpaper_name};
use crate::audio::{FadeOutcome, RainFader};
use crate::common::utils::format_duration;
use crate::core::stop::StopSignal;
use crate::display::DisplayHandle;
use crate::time::{Thresholds, TimeSource, TimeWindow, classify_time};

/// What happened when the cycle entered a phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseEntry {
    pub phase: WeatherPhase,
    /// Time window read at phase entry
    pub window: TimeWindow,
    pub wallpaper: String,
    /// Whether the display accepted the wallpaper
    pub presented: bool,
    /// Rain fade run on entry, if the phase has one and rain audio is active
    pub fade: Option<FadeOutcome>,
    /// How long the phase is held after entry
    pub hold: Duration,
}

pub struct WeatherCycle<R: Rng> {
    phase: WeatherPhase,
    timing: WeatherTiming,
    thresholds: Thresholds,
    display: DisplayHandle,
    rain: Option<RainFader>,
    stop: StopSignal,
    time: Arc<dyn TimeSource>,
    rng: R,
}

impl<R: Rng> WeatherCycle<R> {
    pub fn new(
        timing: WeatherTiming,
        thresholds: Thresholds,
        display: DisplayHandle,
        rain: Option<RainFader>,
        stop: StopSignal,
        time: Arc<dyn TimeSource>,
        rng: R,
    ) -> Self {
        Self {
            phase: WeatherPhase::Clear,
            timing,
            thresholds,
            display,
            rain,
            stop,
            time,
            rng,
        }
    }

    pub fn phase(&self) -> WeatherPhase {
        self.phase
    }

    fn current_window(&self) -> TimeWindow {
        classify_time(&self.time.now(), &self.thresholds)
    }

    /// Show the bare window wallpaper for clear sky. Called once at startup.
    pub fn present_initial(&mut self) -> PhaseEntry {
        let window = self.current_window();
        let wallpaper = wallpaper_name(window, WeatherPhase::Clear);
        let presented = self.display.present_weather(WeatherPhase::Clear, &wallpaper);
        if !presented {
            log_warning!("Initial wallpaper could not be shown, continuing");
        }
        PhaseEntry {
            phase: WeatherPhase::Clear,
            window,
            wallpaper,
            presented,
            fade: None,
            hold: Duration::ZERO,
        }
    }

    /// Enter the next phase: present its wallpaper, run its fade and pick its hold.
    ///
    /// Does not sleep for the hold; [`WeatherCycle::run`] does.
    pub fn step(&mut self) -> PhaseEntry {
        let phase = self.phase.next();
        self.phase = phase;

        let window = self.current_window();
        let wallpaper = wallpaper_name(window, phase);

        log_block_start!("Weather: {}", phase.label());
        let presented = self.display.present_weather(phase, &wallpaper);

        let fade = match (&self.rain, phase) {
            (Some(rain), WeatherPhase::TransitioningToRain) => {
                Some(rain.fade_in(&self.stop, self.time.as_ref()))
            }
            (Some(rain), WeatherPhase::TransitioningToClear) => {
                Some(rain.fade_out(&self.stop, self.time.as_ref()))
            }
            _ => None,
        };

        let hold = self.timing.hold_for(phase, &mut self.rng);
        match phase {
            WeatherPhase::Rain => {
                log_indented!("Rain will last for {}", format_duration(hold.as_secs()))
            }
            WeatherPhase::Clear => {
                log_indented!("Clear skies for {}", format_duration(hold.as_secs()))
            }
            _ => {}
        }

        PhaseEntry {
            phase,
            window,
            wallpaper,
            presented,
            fade,
            hold,
        }
    }

    /// Run the cycle until the stop signal is set.
    pub fn run(mut self) {
        self.present_initial();

        while self.stop.is_running() {
            let entry = self.step();
            if !self.stop.sleep(entry.hold, self.time.as_ref()) {
                break;
            }
        }

        log_debug!("Weather cycle stopped in phase: {}", self.phase);
    }
}
