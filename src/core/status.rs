//! Time-window reconciliation and the in-place status line.

use chrono::{DateTime, Local};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use crate::audio::RainState;
use crate::core::stop::StopSignal;
use crate::display::{DisplayHandle, ReconcileOutcome};
use crate::time::{Thresholds, TimeSource, TimeWindow, classify_time};

/// Periodically brings the bare time-window wallpaper up to date.
///
/// When the window changes while a weather event is on screen the loop stays
/// quiet and keeps the old "last observed" window, so the change is picked up
/// on the first check after the cycle returns to clear sky.
pub struct StatusLoop {
    display: DisplayHandle,
    thresholds: Thresholds,
    interval: Duration,
    last_observed: TimeWindow,
    stop: StopSignal,
    time: Arc<dyn TimeSource>,
}

impl StatusLoop {
    pub fn new(
        display: DisplayHandle,
        thresholds: Thresholds,
        interval: Duration,
        stop: StopSignal,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let last_observed = classify_time(&time.now(), &thresholds);
        Self {
            display,
            thresholds,
            interval,
            last_observed,
            stop,
            time,
        }
    }

    pub fn last_observed(&self) -> TimeWindow {
        self.last_observed
    }

    /// Run one check. Returns `None` when the window has not changed.
    pub fn check(&mut self) -> Option<ReconcileOutcome> {
        let window = classify_time(&self.time.now(), &self.thresholds);
        if window == self.last_observed {
            return None;
        }

        let outcome = self.display.reconcile(window);
        match outcome {
            ReconcileOutcome::DeferredToWeather => {
                log_debug!("Time window is now {window}, waiting for clear skies");
            }
            // A failed present is not retried until the window changes again
            ReconcileOutcome::Presented
            | ReconcileOutcome::AlreadyShowing
            | ReconcileOutcome::Failed => {
                self.last_observed = window;
            }
        }
        Some(outcome)
    }

    pub fn run(mut self) {
        while self.stop.is_running() {
            self.check();
            if !self.stop.sleep(self.interval, self.time.as_ref()) {
                break;
            }
        }
        log_debug!("Status loop stopped");
    }
}

/// Format `[HH:MM:SS] <wallpaper> | Rain: Yes/No`.
pub fn status_line(now: &DateTime<Local>, wallpaper: Option<&str>, raining: bool) -> String {
    format!(
        "[{}] {} | Rain: {}",
        now.format("%H:%M:%S"),
        wallpaper.unwrap_or("-"),
        if raining { "Yes" } else { "No" }
    )
}

/// Rewrite the status line in place every `interval` until stopped.
pub fn run_status_printer(
    display: DisplayHandle,
    rain: RainState,
    interval: Duration,
    stop: StopSignal,
    time: Arc<dyn TimeSource>,
) {
    while stop.is_running() {
        let snapshot = display.snapshot();
        let raining = rain.lock().map(|state| state.playing).unwrap_or(false);
        let line = status_line(&time.now(), snapshot.current.as_deref(), raining);

        let mut stdout = std::io::stdout().lock();
        let _ = write!(stdout, "\r{line:<80}");
        let _ = stdout.flush();
        drop(stdout);

        if !stop.sleep(interval, time.as_ref()) {
            break;
        }
    }
    println!();
}
