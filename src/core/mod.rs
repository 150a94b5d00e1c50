//! The engine: every long-running loop, wired together.
//!
//! [`Engine::start`] spawns the display actor first, then the weather cycle,
//! the music loop, the status loop and the optional status line and overlay
//! threads, all sharing one [`StopSignal`]. [`Engine::wait`] blocks the caller
//! until a shutdown is requested, and [`Engine::shutdown`] stops everything in
//! order: loops first, then audio, then the display (which tears down the
//! wallpaper on its way out).

pub mod status;
pub mod stop;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::audio::{AudioCoordinator, Mixer};
use crate::common::constants::STOP_CHECK_INTERVAL_MS;
use crate::config::{Config, DisplayMode};
use crate::display::{DisplayActor, DisplayHandle, WallpaperPresenter, overlay};
use crate::io::signals::SignalMessage;
use crate::time::TimeSource;
use crate::weather::WeatherCycle;
use status::StatusLoop;
use stop::StopSignal;

/// Everything the engine needs from its caller.
pub struct EngineParams {
    pub config: Config,
    pub presenter: Box<dyn WallpaperPresenter>,
    pub mixer: Arc<dyn Mixer>,
    pub time: Arc<dyn TimeSource>,
    pub stop: StopSignal,
    /// Seed for the weather and playlist randomness; `None` draws from the OS
    pub seed: Option<u64>,
}

/// What the engine did, reported after shutdown.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineReport {
    pub presents: u64,
    pub last_wallpaper: Option<String>,
}

/// Running engine threads.
pub struct Engine {
    display: DisplayHandle,
    display_thread: JoinHandle<()>,
    workers: Vec<(&'static str, JoinHandle<()>)>,
    audio: AudioCoordinator,
    stop: StopSignal,
    time: Arc<dyn TimeSource>,
}

fn spawn_worker<F>(name: &'static str, f: F) -> Result<(&'static str, JoinHandle<()>)>
where
    F: FnOnce() + Send + 'static,
{
    let handle = thread::Builder::new()
        .name(name.into())
        .spawn(f)
        .with_context(|| format!("failed to spawn {name} thread"))?;
    Ok((name, handle))
}

fn make_rng(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
        None => StdRng::from_entropy(),
    }
}

impl Engine {
    pub fn start(params: EngineParams) -> Result<Self> {
        let EngineParams {
            config,
            presenter,
            mixer,
            time,
            stop,
            seed,
        } = params;

        log_block_start!("Starting {} presenter", presenter.kind());
        let (display, display_thread) = DisplayActor::new(presenter).spawn()?;

        let audio = AudioCoordinator::new(&config, mixer);
        let ambient = audio.start_ambient();
        log_debug!("{ambient} ambient sound(s) playing");

        let thresholds = config.thresholds();
        let mut workers = Vec::new();

        // Built before the weather thread runs so the initial window is the baseline
        let status_loop = StatusLoop::new(
            display.clone(),
            thresholds,
            config.status_check_interval(),
            stop.clone(),
            time.clone(),
        );

        let cycle = WeatherCycle::new(
            config.weather_timing(),
            thresholds,
            display.clone(),
            audio.rain_fader(),
            stop.clone(),
            time.clone(),
            make_rng(seed, 0),
        );
        workers.push(spawn_worker("weather", move || cycle.run())?);

        if let Some(music) = audio.music_loop(&mut make_rng(seed, 1), stop.clone(), time.clone()) {
            workers.push(spawn_worker("music", move || music.run())?);
        }

        workers.push(spawn_worker("status", move || status_loop.run())?);

        if config.debug.show_status_updates {
            let display = display.clone();
            let rain = audio.rain_state();
            let interval = Duration::from_secs(config.debug.status_update_interval);
            let stop = stop.clone();
            let time = time.clone();
            workers.push(spawn_worker("status-line", move || {
                status::run_status_printer(display, rain, interval, stop, time)
            })?);
        }

        if config.display.mode == DisplayMode::Window && config.display.show_overlay {
            let display = display.clone();
            let stop = stop.clone();
            let time = time.clone();
            workers.push(spawn_worker("overlay", move || {
                overlay::run_overlay_ticker(display, thresholds, stop, time)
            })?);
        }

        log_decorated!("Running, press Ctrl+C to stop");

        Ok(Self {
            display,
            display_thread,
            workers,
            audio,
            stop,
            time,
        })
    }

    pub fn display(&self) -> &DisplayHandle {
        &self.display
    }

    /// Block until a shutdown message arrives, the stop signal is lowered or
    /// the time source runs out.
    pub fn wait(&self, shutdown: &Receiver<SignalMessage>) {
        let tick = Duration::from_millis(STOP_CHECK_INTERVAL_MS);
        loop {
            match shutdown.recv_timeout(tick) {
                Ok(SignalMessage::Shutdown { signal }) => {
                    log_debug!("Shutdown requested by signal {signal}");
                    return;
                }
                Err(RecvTimeoutError::Timeout) => {
                    if !self.stop.is_running() || self.time.is_ended() {
                        return;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    }

    /// Stop every loop, silence audio and tear down the wallpaper.
    pub fn shutdown(self) -> EngineReport {
        self.stop.stop();

        for (name, handle) in self.workers {
            if handle.join().is_err() {
                log_warning!("The {name} thread panicked");
            }
        }

        self.audio.shutdown();
        log_decorated!("Audio stopped");

        let snapshot = self.display.snapshot();
        self.display.shutdown();
        if self.display_thread.join().is_err() {
            log_warning!("The display thread panicked");
        }
        log_debug!("Display stopped");

        EngineReport {
            presents: snapshot.presents,
            last_wallpaper: snapshot.current,
        }
    }
}
