//! Display actor: the single owner of the presenter.
//!
//! The weather cycle and the status loop never touch the presenter directly.
//! They send commands to this actor, which runs them one at a time on its own
//! thread. The status loop's "is a weather event on screen?" check and the
//! resulting present therefore happen atomically with respect to weather
//! updates, and host tool calls are strictly sequential.
//!
//! Other threads observe the display through [`DisplaySnapshot`], written only
//! here.

use anyhow::{Context, Result};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use super::{PresentError, WallpaperPresenter};
use crate::time::TimeWindow;
use crate::weather::{WeatherPhase, is_weather_wallpaper};

/// What is on screen, as last recorded by the actor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplaySnapshot {
    /// Name of the last successfully presented wallpaper
    pub current: Option<String>,
    /// Phase most recently announced by the weather cycle
    pub phase: WeatherPhase,
    /// Number of successful presents since startup
    pub presents: u64,
}

impl DisplaySnapshot {
    /// True while the weather cycle is away from clear sky or a weather
    /// wallpaper is still showing.
    pub fn is_mid_weather(&self) -> bool {
        self.phase.is_weather_event()
            || self.current.as_deref().is_some_and(is_weather_wallpaper)
    }
}

/// Result of a time-window reconciliation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The bare window wallpaper was presented
    Presented,
    /// It was already on screen
    AlreadyShowing,
    /// A weather event is in progress; nothing was done
    DeferredToWeather,
    /// The present was attempted and failed
    Failed,
}

enum DisplayCommand {
    Weather {
        phase: WeatherPhase,
        name: String,
        reply: Sender<bool>,
    },
    Reconcile {
        window: TimeWindow,
        reply: Sender<ReconcileOutcome>,
    },
    Overlay(String),
    Shutdown,
}

/// Cloneable handle for sending commands to the actor.
#[derive(Clone)]
pub struct DisplayHandle {
    sender: Sender<DisplayCommand>,
    snapshot: Arc<Mutex<DisplaySnapshot>>,
}

impl DisplayHandle {
    /// Announce a weather phase and present its wallpaper.
    ///
    /// Blocks until the actor has tried; returns whether the present succeeded.
    pub fn present_weather(&self, phase: WeatherPhase, name: &str) -> bool {
        let (reply, response) = channel();
        let command = DisplayCommand::Weather {
            phase,
            name: name.to_string(),
            reply,
        };
        if self.sender.send(command).is_err() {
            return false;
        }
        response.recv().unwrap_or(false)
    }

    /// Present the bare wallpaper for `window` unless a weather event is showing.
    pub fn reconcile(&self, window: TimeWindow) -> ReconcileOutcome {
        let (reply, response) = channel();
        if self
            .sender
            .send(DisplayCommand::Reconcile { window, reply })
            .is_err()
        {
            return ReconcileOutcome::Failed;
        }
        response.recv().unwrap_or(ReconcileOutcome::Failed)
    }

    /// Replace the overlay text. Fire and forget.
    pub fn show_overlay(&self, text: String) {
        let _ = self.sender.send(DisplayCommand::Overlay(text));
    }

    /// Ask the actor to tear down the wallpaper and exit.
    pub fn shutdown(&self) {
        let _ = self.sender.send(DisplayCommand::Shutdown);
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        self.snapshot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// The actor state, living on its own thread.
pub struct DisplayActor {
    presenter: Box<dyn WallpaperPresenter>,
    snapshot: Arc<Mutex<DisplaySnapshot>>,
}

impl DisplayActor {
    pub fn new(presenter: Box<dyn WallpaperPresenter>) -> Self {
        Self {
            presenter,
            snapshot: Arc::new(Mutex::new(DisplaySnapshot::default())),
        }
    }

    /// Start the actor thread.
    pub fn spawn(self) -> Result<(DisplayHandle, JoinHandle<()>)> {
        let (sender, receiver) = channel();
        let handle = DisplayHandle {
            sender,
            snapshot: self.snapshot.clone(),
        };

        let join = thread::Builder::new()
            .name("display".into())
            .spawn(move || self.run(receiver))
            .context("failed to spawn display thread")?;

        Ok((handle, join))
    }

    fn run(mut self, receiver: Receiver<DisplayCommand>) {
        log_debug!("Display actor started ({} presenter)", self.presenter.kind());

        for command in receiver.iter() {
            match command {
                DisplayCommand::Weather { phase, name, reply } => {
                    self.update(|s| s.phase = phase);
                    let ok = self.present(&name);
                    let _ = reply.send(ok);
                }
                DisplayCommand::Reconcile { window, reply } => {
                    let _ = reply.send(self.reconcile(window));
                }
                DisplayCommand::Overlay(text) => {
                    self.presenter.show_overlay(&text);
                }
                DisplayCommand::Shutdown => break,
            }
        }

        self.presenter.teardown();
        log_debug!("Display actor stopped");
    }

    fn reconcile(&mut self, window: TimeWindow) -> ReconcileOutcome {
        let snapshot = self.snapshot();
        if snapshot.is_mid_weather() {
            return ReconcileOutcome::DeferredToWeather;
        }

        let desired = window.as_str();
        if snapshot.current.as_deref() == Some(desired) {
            return ReconcileOutcome::AlreadyShowing;
        }

        if self.present(desired) {
            log_block_start!("Time window changed to: {window}");
            ReconcileOutcome::Presented
        } else {
            ReconcileOutcome::Failed
        }
    }

    fn present(&mut self, name: &str) -> bool {
        match self.presenter.present(name) {
            Ok(()) => {
                self.update(|s| {
                    s.current = Some(name.to_string());
                    s.presents += 1;
                });
                log_decorated!("✓ Wallpaper set: {name}");
                true
            }
            Err(PresentError::MissingAsset(path)) => {
                log_warning!("Video file not found: {}", path.display());
                false
            }
            Err(e) => {
                log_error!("✗ Failed to set wallpaper {name}: {e}");
                false
            }
        }
    }

    fn snapshot(&self) -> DisplaySnapshot {
        self.snapshot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn update(&self, f: impl FnOnce(&mut DisplaySnapshot)) {
        let mut guard = self.snapshot.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    /// Presenter that records calls and fails for names in `failing`.
    struct Recorder {
        log: Arc<StdMutex<Vec<String>>>,
        failing: Vec<&'static str>,
        torn_down: Arc<StdMutex<bool>>,
    }

    impl WallpaperPresenter for Recorder {
        fn present(&mut self, name: &str) -> Result<(), PresentError> {
            self.log.lock().unwrap().push(name.to_string());
            if self.failing.contains(&name) {
                Err(PresentError::Player("scripted failure".into()))
            } else {
                Ok(())
            }
        }

        fn teardown(&mut self) {
            *self.torn_down.lock().unwrap() = true;
        }

        fn kind(&self) -> &'static str {
            "recorder"
        }
    }

    fn spawn_recorder(
        failing: Vec<&'static str>,
    ) -> (
        DisplayHandle,
        JoinHandle<()>,
        Arc<StdMutex<Vec<String>>>,
        Arc<StdMutex<bool>>,
    ) {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let torn_down = Arc::new(StdMutex::new(false));
        let presenter = Recorder {
            log: log.clone(),
            failing,
            torn_down: torn_down.clone(),
        };
        let (handle, join) = DisplayActor::new(Box::new(presenter)).spawn().unwrap();
        (handle, join, log, torn_down)
    }

    #[test]
    fn test_weather_present_updates_snapshot() {
        let (handle, join, _log, _) = spawn_recorder(vec![]);

        assert!(handle.present_weather(WeatherPhase::Rain, "evening_rain"));
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.current.as_deref(), Some("evening_rain"));
        assert_eq!(snapshot.phase, WeatherPhase::Rain);
        assert!(snapshot.is_mid_weather());

        handle.shutdown();
        join.join().unwrap();
    }

    #[test]
    fn test_failed_present_keeps_previous_name_but_records_phase() {
        let (handle, join, _log, _) = spawn_recorder(vec!["day_to_rain"]);

        assert!(handle.present_weather(WeatherPhase::Clear, "day"));
        assert!(!handle.present_weather(WeatherPhase::TransitioningToRain, "day_to_rain"));

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.current.as_deref(), Some("day"));
        assert_eq!(snapshot.phase, WeatherPhase::TransitioningToRain);
        assert_eq!(snapshot.presents, 1);

        handle.shutdown();
        join.join().unwrap();
    }

    #[test]
    fn test_reconcile_defers_during_weather() {
        let (handle, join, log, _) = spawn_recorder(vec![]);

        handle.present_weather(WeatherPhase::Rain, "evening_rain");
        assert_eq!(
            handle.reconcile(TimeWindow::Night),
            ReconcileOutcome::DeferredToWeather
        );
        assert_eq!(*log.lock().unwrap(), ["evening_rain"]);

        handle.shutdown();
        join.join().unwrap();
    }

    #[test]
    fn test_reconcile_presents_when_clear() {
        let (handle, join, log, _) = spawn_recorder(vec![]);

        handle.present_weather(WeatherPhase::Clear, "day");
        assert_eq!(handle.reconcile(TimeWindow::Evening), ReconcileOutcome::Presented);
        assert_eq!(handle.reconcile(TimeWindow::Evening), ReconcileOutcome::AlreadyShowing);
        assert_eq!(*log.lock().unwrap(), ["day", "evening"]);

        handle.shutdown();
        join.join().unwrap();
    }

    #[test]
    fn test_reconcile_failure_is_reported() {
        let (handle, join, _log, _) = spawn_recorder(vec!["night"]);

        handle.present_weather(WeatherPhase::Clear, "evening");
        assert_eq!(handle.reconcile(TimeWindow::Night), ReconcileOutcome::Failed);
        assert_eq!(handle.snapshot().current.as_deref(), Some("evening"));

        handle.shutdown();
        join.join().unwrap();
    }

    #[test]
    fn test_shutdown_tears_down_and_later_calls_fail() {
        let (handle, join, _log, torn_down) = spawn_recorder(vec![]);

        handle.shutdown();
        join.join().unwrap();

        assert!(*torn_down.lock().unwrap());
        assert!(!handle.present_weather(WeatherPhase::Clear, "day"));
        assert_eq!(handle.reconcile(TimeWindow::Day), ReconcileOutcome::Failed);
    }
}
