//! Application coordinator: resources in, engine run, resources out.
//!
//! [`Rainpaper`] acquires what the engine needs (configuration, the instance
//! lock, the terminal, signal handling, a presenter and a mixer), runs the
//! engine until shutdown, and releases everything in reverse order.
//!
//! - Normal startup: `Rainpaper::new(debug).run()`
//! - Simulation: `Rainpaper::new(debug).without_lock().without_headers().dry_run().run()`

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use crate::audio::{self, Mixer, SilentMixer};
use crate::common::logger::Log;
use crate::common::utils::TerminalGuard;
use crate::config::{self, Config};
use crate::core::stop::StopSignal;
use crate::core::{Engine, EngineParams, EngineReport};
use crate::display::{self, AssetResolver, WallpaperPresenter, dry_run::DryRunPresenter};
use crate::io::lock::{LockStatus, acquire_lock, default_lock_path};
use crate::io::signals::setup_signal_handler;
use crate::time::source;

pub struct Rainpaper {
    debug_enabled: bool,
    config_path: Option<PathBuf>,
    create_lock: bool,
    show_headers: bool,
    dry_run: bool,
    seed: Option<u64>,
}

impl Rainpaper {
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            config_path: None,
            create_lock: true,
            show_headers: true,
            dry_run: false,
            seed: None,
        }
    }

    /// Read configuration from this file instead of the default location.
    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Skip the single-instance lock (simulation does not touch the desktop).
    pub fn without_lock(mut self) -> Self {
        self.create_lock = false;
        self
    }

    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    /// Resolve and log wallpapers without showing them, and play no audio.
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn run(self) -> Result<()> {
        if self.show_headers {
            log_version!();
        }

        let (config, config_source) = config::load_or_default(self.config_path.as_deref());
        Log::set_verbose(self.debug_enabled || config.debug.verbose_logging);
        config.log_config(&config_source.describe());

        let _lock = if self.create_lock {
            let lock_path = default_lock_path();
            match acquire_lock(&lock_path)? {
                LockStatus::Acquired(lock) => Some(lock),
                LockStatus::HeldBy(pid) => {
                    log_pipe!();
                    log_error!("rainpaper is already running (PID {pid})");
                    log_indented!("Stop it first, or remove {}", lock_path.display());
                    log_end!();
                    std::process::exit(crate::common::constants::EXIT_FAILURE);
                }
            }
        } else {
            None
        };

        // Only worth hiding the cursor while the status line redraws in place
        let _term = if config.debug.show_status_updates {
            TerminalGuard::new().unwrap_or(None)
        } else {
            None
        };

        let stop = StopSignal::new();
        let signals = setup_signal_handler(stop.clone())?;
        let time = source::global();

        let (presenter, mixer) = self.collaborators(&config, stop.clone(), time.clone());

        let engine = Engine::start(EngineParams {
            config,
            presenter,
            mixer,
            time,
            stop,
            seed: self.seed,
        })?;

        engine.wait(&signals.signal_receiver);
        if source::global().is_ended() {
            log_pipe!();
            log_info!("Simulation finished");
        }

        let report = engine.shutdown();
        signals.close();
        log_summary(&report);

        log_end!();
        Ok(())
    }

    fn collaborators(
        &self,
        config: &Config,
        stop: StopSignal,
        time: Arc<dyn source::TimeSource>,
    ) -> (Box<dyn WallpaperPresenter>, Arc<dyn Mixer>) {
        if self.dry_run {
            let presenter = DryRunPresenter::new(AssetResolver::from_config(config));
            return (Box::new(presenter), Arc::new(SilentMixer));
        }
        (
            display::create_presenter(config, stop, time),
            audio::create_mixer(config),
        )
    }
}

fn log_summary(report: &EngineReport) {
    log_block_start!("Wallpapers presented: {}", report.presents);
    if let Some(last) = &report.last_wallpaper {
        log_indented!("Last wallpaper: {last}");
    }
    log_decorated!("Goodbye!");
}
