//! `rainpaper simulate`: run the engine against an accelerated clock.
//!
//! Nothing is shown or played. Wallpaper changes are logged with the simulated
//! time in front of every line, which makes it easy to check how a day plays
//! out with a given configuration.

use anyhow::Result;
use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;

use crate::common::logger::Log;
use crate::rainpaper::Rainpaper;
use crate::time::source::{self, DEFAULT_SIMULATION_MULTIPLIER, SimulatedTimeSource};

pub struct SimulateOptions {
    pub start_time: String,
    pub end_time: String,
    /// 0 selects the default multiplier
    pub multiplier: f64,
    pub log_to_file: bool,
    pub debug_enabled: bool,
    pub seed: Option<u64>,
    pub config_path: Option<PathBuf>,
}

pub fn handle_simulate_command(options: SimulateOptions) -> Result<()> {
    let start = source::parse_datetime(&options.start_time)
        .map_err(|e| anyhow::anyhow!("Invalid start time: {e}"))?;
    let end = source::parse_datetime(&options.end_time)
        .map_err(|e| anyhow::anyhow!("Invalid end time: {e}"))?;
    if end <= start {
        anyhow::bail!("End time must be after start time");
    }

    let multiplier = if options.multiplier > 0.0 {
        options.multiplier
    } else {
        DEFAULT_SIMULATION_MULTIPLIER
    };

    // Before any logging, so every line carries the simulated timestamp
    source::init_time_source(Arc::new(SimulatedTimeSource::new(start, end, multiplier)));

    let _log_guard = if options.log_to_file {
        let file_name = format!(
            "rainpaper-simulation-{}.log",
            Local::now().format("%Y%m%d-%H%M%S")
        );
        let guard = Log::start_file_logging(file_name.clone())?;
        println!("Writing simulation log to {file_name}");
        Some(guard)
    } else {
        None
    };

    log_version!();
    log_block_start!("Simulation Mode");
    log_decorated!(
        "Simulating from {} to {}",
        start.format("%Y-%m-%d %H:%M:%S"),
        end.format("%Y-%m-%d %H:%M:%S")
    );

    let duration = end.signed_duration_since(start);
    log_indented!(
        "Total simulated time: {} hours {} minutes",
        duration.num_hours(),
        duration.num_minutes() % 60
    );
    log_indented!(
        "Time acceleration: {}x (will complete in ~{:.1} seconds)",
        multiplier,
        duration.num_seconds() as f64 / multiplier
    );
    log_indented!("Wallpapers are resolved but not shown, audio is silent");
    if let Some(seed) = options.seed {
        log_indented!("Weather seed: {seed}");
    }

    Rainpaper::new(options.debug_enabled)
        .with_config_path(options.config_path)
        .without_lock()
        .without_headers()
        .dry_run()
        .with_seed(options.seed)
        .run()
}
